//! Core types, errors, and configuration for Chatpulse
//!
//! This crate holds the data model shared by the analysis pipeline and the
//! command-line front end: parsed messages, per-user statistics, centrality
//! records, collaborator outputs and the final analysis report.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::{AnalysisConfig, ChatpulseConfig, LogLevel, LoggingConfig, ScoreWeights};
pub use error::{Error, Result};
pub use types::*;
