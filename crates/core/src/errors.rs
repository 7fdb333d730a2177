use serde::Serialize;
use thiserror::Error;

use crate::stats::EmptySeries;

/// Failures an engine operation can report to its caller.
///
/// Engines never panic across their public boundary; every failure becomes a
/// value the transport layer can serialize. One bad item in a batch must not
/// abort its siblings, so item-level failures stay `Result`s rather than
/// bubbling into the batch loop.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum EngineError {
    #[error("insufficient historical data: need at least {min_required} records, got {provided}")]
    InsufficientData { min_required: usize, provided: usize },
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("unknown batch type `{0}`")]
    UnknownBatchType(String),
    #[error("profile not found for user `{0}`")]
    ProfileNotFound(String),
    #[error(transparent)]
    Stats(#[from] EmptySeries),
}

/// Wire shape for a failed operation: `{error, min_required?, provided?}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_required: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provided: Option<usize>,
}

impl From<&EngineError> for ErrorBody {
    fn from(error: &EngineError) -> Self {
        match error {
            EngineError::InsufficientData { min_required, provided } => Self {
                error: "Insufficient historical data for prediction".to_string(),
                min_required: Some(*min_required),
                provided: Some(*provided),
            },
            other => Self { error: other.to_string(), min_required: None, provided: None },
        }
    }
}
