use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;
use sqlx::types::Json;

use crate::models::{Record, Submission, SubmissionIndex};

pub async fn create(
    pool: &SqlitePool,
    data: &Record,
    timestamp: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO form_submissions (data, timestamp) VALUES (?1, ?2)")
        .bind(Json(data))
        .bind(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT id, data, timestamp FROM form_submissions ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(
        "SELECT id, data, timestamp FROM form_submissions WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Equality lookup on one of the secondary keys.
pub async fn find_by_index(
    pool: &SqlitePool,
    index: SubmissionIndex,
    value: &str,
) -> Result<Vec<Submission>, sqlx::Error> {
    sqlx::query_as::<_, Submission>(&format!(
        "SELECT id, data, timestamp FROM form_submissions
         WHERE {} = ?1
         ORDER BY id ASC",
        index.expression()
    ))
    .bind(value)
    .fetch_all(pool)
    .await
}

/// Returns the number of rows removed; zero when `id` was absent.
pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM form_submissions WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM form_submissions")
        .fetch_one(pool)
        .await
}
