use std::sync::Arc;

use crate::config::Config;
use crate::export::Exporter;
use crate::store::{Ledger, SubmissionStore};
use crate::submission::defaults::FormDefaults;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub store: SubmissionStore,
    pub config: Config,
    pub defaults: FormDefaults,
    pub exporter: Exporter,
}

impl AppState {
    pub fn ledger(&self) -> Ledger {
        self.store.ledger(self.config.ledger_key.clone())
    }
}
