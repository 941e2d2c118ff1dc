//! Error types for CLI operations.

use thiserror::Error;

/// Main error type for CLI operations.
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error.
    #[error("File system error: {0}")]
    FileSystem(String),

    /// Analysis error.
    #[error("Analysis error: {0}")]
    Analysis(#[from] chatpulse_analysis::AnalysisError),

    /// Invalid argument error.
    #[error("Invalid argument: {0}")]
    Argument(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<chatpulse_core::Error> for CliError {
    fn from(err: chatpulse_core::Error) -> Self {
        CliError::Config(err.to_string())
    }
}

/// Result alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;
