use thiserror::Error;

/// Errors that can occur during analysis operations.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The transcript produced no messages after parsing and filtering.
    #[error("No valid messages parsed")]
    EmptyInput,
    /// A collaborator failed to produce output.
    #[error("Collaborator error: {0}")]
    Collaborator(String),
    /// Collaborator output is not index-aligned with the messages.
    #[error("Misaligned collaborator output: expected {expected} entries, got {actual}")]
    Misaligned {
        /// Number of messages.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },
    /// Error from the core crate.
    #[error(transparent)]
    Core(#[from] chatpulse_core::Error),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = Result<T, AnalysisError>;

/// Fail unless a collaborator produced exactly one entry per message.
pub(crate) fn ensure_aligned(expected: usize, actual: usize) -> AnalysisResult<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(AnalysisError::Misaligned { expected, actual })
    }
}
