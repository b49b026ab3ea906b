use chrono::Utc;
use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::{Record, SYSTEM_KEYS, Submission, SubmissionIndex};

/// Local submission storage. Cloning is cheap; clones share one pool.
#[derive(Debug, Clone)]
pub struct SubmissionStore {
    pool: SqlitePool,
}

impl SubmissionStore {
    /// Connect to `url` and make sure the collection exists.
    pub async fn open(url: &str) -> Result<Self, AppError> {
        let pool = db::connect(url).await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self, AppError> {
        let store = SubmissionStore { pool };
        store.initialize().await?;
        Ok(store)
    }

    /// Re-run the idempotent schema step.
    pub async fn initialize(&self) -> Result<(), AppError> {
        db::initialize(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Stamp `record` with its creation time, insert it and return the new id.
    pub async fn save(&self, mut record: Record) -> Result<i64, AppError> {
        for key in SYSTEM_KEYS {
            if record.shift_remove(key).is_some() {
                tracing::debug!("Dropped caller-supplied '{key}' from submission");
            }
        }

        let id = db::submissions::create(&self.pool, &record, Utc::now()).await?;
        tracing::info!("Saved submission {id}");
        Ok(id)
    }

    pub async fn list_all(&self) -> Result<Vec<Submission>, AppError> {
        Ok(db::submissions::list_all(&self.pool).await?)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Submission>, AppError> {
        Ok(db::submissions::find_by_id(&self.pool, id).await?)
    }

    pub async fn find_by(
        &self,
        index: SubmissionIndex,
        value: &str,
    ) -> Result<Vec<Submission>, AppError> {
        Ok(db::submissions::find_by_index(&self.pool, index, value).await?)
    }

    /// Remove the submission with `id`. Absent ids are not an error.
    pub async fn delete_by_id(&self, id: i64) -> Result<(), AppError> {
        let removed = db::submissions::delete(&self.pool, id).await?;
        if removed == 0 {
            tracing::debug!("Delete of submission {id}: not present");
        } else {
            tracing::info!("Deleted submission {id}");
        }
        Ok(())
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        Ok(db::submissions::count(&self.pool).await?)
    }

    /// Handle on the accumulated-export slot stored under `key`.
    pub fn ledger(&self, key: impl Into<String>) -> Ledger {
        Ledger {
            pool: self.pool.clone(),
            key: key.into(),
        }
    }

    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// Append-only list of exported records, kept apart from the submissions
/// collection. Nothing clears it.
#[derive(Debug, Clone)]
pub struct Ledger {
    pool: SqlitePool,
    key: String,
}

impl Ledger {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn load(&self) -> Result<Vec<Record>, AppError> {
        Ok(db::ledger::load(&self.pool, &self.key).await?)
    }

    /// Append `records` to the slot in one transaction and return the full list.
    pub async fn append(&self, records: &[Record]) -> Result<Vec<Record>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut merged = db::ledger::load(&mut *tx, &self.key).await?;
        merged.extend_from_slice(records);
        db::ledger::store(&mut *tx, &self.key, &merged).await?;
        tx.commit().await?;

        tracing::debug!(
            "Ledger '{}' now holds {} records (+{})",
            self.key,
            merged.len(),
            records.len()
        );
        Ok(merged)
    }
}
