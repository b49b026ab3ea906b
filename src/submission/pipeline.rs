use crate::error::AppError;
use crate::models::Record;
use crate::state::SharedState;

use super::fields;

pub struct PipelineResult {
    pub submission_id: i64,
    pub warnings: Vec<String>,
}

/// Fill `input` over the configured defaults and save it.
pub async fn run(state: &SharedState, input: Record) -> Result<PipelineResult, AppError> {
    let record = state.defaults.fill(input);

    let warnings = fields::validate_fields(&record);
    if !warnings.is_empty() {
        tracing::debug!("Validation warnings for new submission: {:?}", warnings);
    }

    let submission_id = state.store.save(record).await?;

    Ok(PipelineResult {
        submission_id,
        warnings,
    })
}
