use crate::metrics::MetricsError;

/// Failures a caller outside the engine can act on.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Metrics unavailable: {0}")]
    Metrics(#[from] MetricsError),
}
