use sqlx::types::Json;
use sqlx::SqliteExecutor;

use crate::models::Record;

/// Read the list held in `key`. An unset slot reads as empty.
pub async fn load<'e, E>(executor: E, key: &str) -> Result<Vec<Record>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let row: Option<Json<Vec<Record>>> =
        sqlx::query_scalar("SELECT records FROM ledger_slots WHERE slot = ?1")
            .bind(key)
            .fetch_optional(executor)
            .await?;
    Ok(row.map(|Json(records)| records).unwrap_or_default())
}

/// Replace the list held in `key`.
pub async fn store<'e, E>(executor: E, key: &str, records: &[Record]) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO ledger_slots (slot, records) VALUES (?1, ?2)
         ON CONFLICT(slot) DO UPDATE SET records = excluded.records",
    )
    .bind(key)
    .bind(Json(records))
    .execute(executor)
    .await?;
    Ok(())
}
