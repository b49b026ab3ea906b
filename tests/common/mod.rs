#![allow(dead_code)]

use std::path::PathBuf;

use serde_json::Value;
use tempfile::TempDir;

use intake::config::Config;
use intake::models::Record;
use intake::state::SharedState;
use intake::store::SubmissionStore;

pub const MEMORY_URL: &str = "sqlite::memory:";

/// A store with its own in-memory database plus a scratch directory for
/// exported files.
pub struct TestStore {
    pub store: SubmissionStore,
    pub dir: TempDir,
}

impl TestStore {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Application state over this store with default configuration.
    pub async fn state(&self) -> SharedState {
        let config = Config {
            database_url: MEMORY_URL.to_string(),
            export_file: self.path("export.xlsx"),
            ..Config::default()
        };
        intake::build_state(self.store.clone(), config)
            .await
            .expect("Failed to build state")
    }
}

/// Spawn a store backed by a fresh in-memory database.
pub async fn spawn_store() -> TestStore {
    let store = SubmissionStore::open(MEMORY_URL)
        .await
        .expect("Failed to open in-memory store");
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    TestStore { store, dir }
}

/// SQLite URL for a database file inside `dir`.
pub fn file_url(dir: &TempDir) -> String {
    format!("sqlite://{}", dir.path().join("intake.db").display())
}

/// Build a record from a JSON object literal.
pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

pub async fn cleanup(test: TestStore) {
    test.store.close().await;
}
