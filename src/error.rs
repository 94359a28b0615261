use thiserror::Error;

/// Failures of a single prediction request or of process startup.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A free-text label did not match any entry of a category table.
    #[error("unknown {table} '{label}'")]
    UnknownCategory { table: &'static str, label: String },

    /// The collected form violates a team-pair or numeric-bound constraint.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("scaling failed: {0}")]
    ScalingError(String),

    #[error("inference failed: {0}")]
    InferenceError(String),

    /// Artifacts could not be loaded; no prediction is possible.
    #[error("startup failed: {0}")]
    StartupError(String),
}

impl PipelineError {
    /// True for errors caused by what the user typed rather than by the artifacts.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PipelineError::UnknownCategory { .. } | PipelineError::InvalidInput(_)
        )
    }
}
