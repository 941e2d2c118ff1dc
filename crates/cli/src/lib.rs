//! Command-line interface for Chatpulse.
//!
//! This crate provides commands for parsing chat exports, running the
//! engagement analysis and managing the configuration file.

#![deny(missing_docs, unsafe_code)]

/// CLI command definitions and parsing.
pub mod commands;

/// CLI application entry point and configuration.
pub mod app;

/// Error types for CLI operations.
pub mod error;
