pub mod config;
pub mod error;
pub mod state;
pub mod db;
pub mod models;
pub mod store;
pub mod export;
pub mod submission;
pub mod upload;
pub mod cli;

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::export::Exporter;
use crate::state::{AppState, SharedState};
use crate::store::SubmissionStore;
use crate::submission::defaults::FormDefaults;

/// Wire the store, defaults and exporter together for `config`.
pub async fn build_state(store: SubmissionStore, config: Config) -> Result<SharedState, AppError> {
    let defaults = FormDefaults::load(config.defaults_profile, config.defaults_file.as_deref()).await?;
    let exporter = Exporter::from_config(&config);

    tracing::debug!(
        "Using {:?} defaults, sheet '{}', ledger '{}'",
        config.defaults_profile,
        config.sheet_name,
        config.ledger_key
    );

    Ok(Arc::new(AppState {
        store,
        config,
        defaults,
        exporter,
    }))
}
