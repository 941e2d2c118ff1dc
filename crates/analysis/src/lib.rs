//! Transcript parsing and conversation analytics for Chatpulse.
//!
//! The pipeline turns a raw chat export into an ordered message stream,
//! folds it into per-user statistics, builds a temporal interaction graph,
//! measures semantic uniqueness and influence from externally produced
//! embeddings, and reduces everything into a comparable value score.

#![deny(missing_docs, unsafe_code)]

/// Plain-text transcript parsers.
pub mod parsers;

/// Lightweight text signals (words, questions, code, links).
pub mod nlp;

/// Per-user accumulation over the message stream.
pub mod aggregate;

/// Temporal interaction graph.
pub mod graph;

/// Betweenness and eigenvector centrality.
pub mod centrality;

/// Semantic uniqueness and idea influence.
pub mod influence;

/// Weighted value scoring.
pub mod scoring;

/// Optional external model capabilities.
pub mod collaborators;

/// End-to-end orchestration.
pub mod pipeline;

/// Error types for analysis operations.
pub mod error;

pub use error::{AnalysisError, AnalysisResult};
pub use pipeline::Pipeline;
