pub mod ledger;
pub mod submissions;

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::models::SubmissionIndex;

/// Name of the collection as seen by callers; stored as `form_submissions`.
pub const COLLECTION: &str = "formSubmissions";
pub const SUBMISSIONS_TABLE: &str = "form_submissions";
pub const LEDGER_TABLE: &str = "ledger_slots";
pub const SCHEMA_VERSION: i64 = 1;

/// Open a pool against `url`, creating the database file when missing.
///
/// In-memory databases only live as long as their last connection, so those
/// get a single connection that is never reaped.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await?
    };

    Ok(pool)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Ensure the submissions collection, its secondary indexes and the ledger
/// table exist. Safe to call any number of times; existing rows are never
/// touched.
pub async fn initialize(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let existed: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
    )
    .bind(SUBMISSIONS_TABLE)
    .fetch_one(pool)
    .await?;

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {SUBMISSIONS_TABLE} (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             data TEXT NOT NULL CHECK (json_valid(data)),
             timestamp TEXT NOT NULL
         )"
    ))
    .execute(&mut *tx)
    .await?;

    for index in SubmissionIndex::ALL {
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {} ON {SUBMISSIONS_TABLE} ({})",
            index.index_name(),
            index.expression(),
        ))
        .execute(&mut *tx)
        .await?;
    }

    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {LEDGER_TABLE} (
             slot TEXT PRIMARY KEY,
             records TEXT NOT NULL CHECK (json_valid(records))
         )"
    ))
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    let version: i64 = sqlx::query_scalar("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    if version < SCHEMA_VERSION {
        sqlx::query(&format!("PRAGMA user_version = {SCHEMA_VERSION}"))
            .execute(pool)
            .await?;
    }

    if existed {
        tracing::debug!("Collection {COLLECTION} already present");
    } else {
        tracing::info!("Created collection {COLLECTION} (schema v{SCHEMA_VERSION})");
    }

    Ok(())
}
