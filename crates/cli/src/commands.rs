//! CLI command definitions for Chatpulse.
//!
//! Provides the command-line interface for parsing chat exports and running
//! the engagement analysis over them.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI application.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Logging verbosity
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "CHATPULSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a chat export and print the recovered messages
    Parse(ParseArgs),

    /// Analyze engagement, interaction structure and influence in a chat export
    Analyze(AnalyzeArgs),

    /// Inspect or create the configuration file
    Config(ConfigArgs),
}

/// Transcript parsing arguments.
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Plain-text chat export
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Analysis arguments.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Plain-text chat export
    pub input: PathBuf,

    /// JSON array of per-message embedding vectors
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// JSON array of per-message emotion predictions ({"label", "score"})
    #[arg(long)]
    pub emotions: Option<PathBuf>,

    /// JSON array of per-message message-type predictions ({"label", "score"})
    #[arg(long = "message-types")]
    pub message_types: Option<PathBuf>,

    /// JSON topic assignment ({"topics": [...], "names": {...}})
    #[arg(long)]
    pub topics: Option<PathBuf>,

    /// Engagement window in minutes
    #[arg(short, long)]
    pub window: Option<i64>,

    /// JSON object of score weights; missing dimensions weigh 0
    #[arg(long)]
    pub weights: Option<PathBuf>,

    /// Run the graph and influence stages one after the other
    #[arg(long, default_value_t = false)]
    pub sequential: bool,

    /// Output format
    #[arg(short, long, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

/// Configuration file arguments.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analyze_accepts_collaborator_files_and_overrides() {
        let cli = Cli::try_parse_from([
            "chatpulse",
            "-vv",
            "analyze",
            "chat.txt",
            "--embeddings",
            "vectors.json",
            "--message-types",
            "types.json",
            "--window",
            "45",
            "--sequential",
            "--format",
            "json",
        ])
        .expect("valid arguments");

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Analyze(args) => {
                assert_eq!(args.input, PathBuf::from("chat.txt"));
                assert_eq!(args.embeddings, Some(PathBuf::from("vectors.json")));
                assert_eq!(args.message_types, Some(PathBuf::from("types.json")));
                assert_eq!(args.window, Some(45));
                assert!(args.sequential);
                assert_eq!(args.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn parse_defaults_to_text_output() {
        let cli = Cli::try_parse_from(["chatpulse", "parse", "chat.txt"]).expect("valid arguments");
        match cli.command {
            Commands::Parse(args) => assert_eq!(args.format, OutputFormat::Text),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["chatpulse", "parse", "chat.txt", "--format", "yaml"]).is_err());
    }
}
