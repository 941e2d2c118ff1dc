//! CLI application entry point and configuration.
//!
//! This module provides the main CLI application logic, including argument parsing,
//! configuration loading, and command dispatch.

use crate::commands::{AnalyzeArgs, Cli, Commands, ConfigArgs, ConfigCommand, OutputFormat, ParseArgs};
use crate::error::{CliError, Result};
use chatpulse_analysis::collaborators::{
    Collaborators, PrecomputedEmbeddings, PrecomputedLabels, PrecomputedTopics,
};
use chatpulse_analysis::parsers::TranscriptParser;
use chatpulse_analysis::Pipeline;
use chatpulse_core::{
    AnalysisConfig, AnalysisReport, ChatpulseConfig, Feature, LabelPrediction, LogLevel, Message,
    ScoreWeights, TopicAssignment,
};
use clap::Parser;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Main CLI application.
#[derive(Debug)]
pub struct App {
    /// Loaded configuration.
    pub config: ChatpulseConfig,
    /// Where the configuration lives, whether or not the file exists yet.
    pub config_path: Option<PathBuf>,
    /// Parsed CLI arguments.
    pub cli: Cli,
}

impl App {
    /// Create a new application instance from command line arguments.
    pub fn new() -> Result<Self> {
        Self::from_cli(Cli::parse())
    }

    /// Create an application instance from already parsed arguments.
    pub fn from_cli(cli: Cli) -> Result<Self> {
        let (config, config_path) = Self::load_config(&cli)?;
        Ok(Self {
            config,
            config_path,
            cli,
        })
    }

    /// Load configuration from the explicit path, or the default location if present.
    fn load_config(cli: &Cli) -> Result<(ChatpulseConfig, Option<PathBuf>)> {
        if let Some(config_path) = &cli.config {
            if config_path.exists() {
                let config = ChatpulseConfig::load(config_path)?;
                return Ok((config, Some(config_path.clone())));
            }
            // `config init` creates the file; every other command needs it.
            if matches!(cli.command, Commands::Config(_)) {
                return Ok((ChatpulseConfig::default(), Some(config_path.clone())));
            }
            return Err(CliError::Config(format!(
                "Configuration file not found: {}",
                config_path.display()
            )));
        }

        let default_path = ChatpulseConfig::default_path();
        match &default_path {
            Some(path) if path.exists() => Ok((ChatpulseConfig::load(path)?, default_path)),
            _ => Ok((ChatpulseConfig::default(), default_path)),
        }
    }

    /// Run the application.
    pub fn run(self) -> Result<()> {
        // Set up logging based on verbosity
        self.setup_logging();

        let output = match &self.cli.command {
            Commands::Parse(args) => self.handle_parse(args)?,
            Commands::Analyze(args) => self.handle_analyze(args)?,
            Commands::Config(args) => self.handle_config(args)?,
        };
        println!("{}", output);
        Ok(())
    }

    fn setup_logging(&self) {
        let level = match self.cli.verbose {
            0 => level_filter(self.config.logging.level),
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        };

        env_logger::Builder::new()
            .filter_level(level)
            .format_module_path(false)
            .format_target(false)
            .format_timestamp(None)
            .try_init()
            .ok(); // Ignore errors if logger already initialized
    }

    /// Parse a transcript and render its messages.
    pub fn handle_parse(&self, args: &ParseArgs) -> Result<String> {
        let text = read_transcript(&args.input)?;
        let (messages, stats) = TranscriptParser::new().parse_with_stats(&text);
        info!(
            "Parsed {} messages from {} ({} system messages dropped)",
            messages.len(),
            args.input.display(),
            stats.filtered_messages
        );

        match args.format {
            OutputFormat::Text => Ok(render_messages(&messages)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&messages).map_err(|e| CliError::Parse(e.to_string()))
            }
        }
    }

    /// Run the analysis pipeline and render its report.
    pub fn handle_analyze(&self, args: &AnalyzeArgs) -> Result<String> {
        let text = read_transcript(&args.input)?;
        let analysis = self.analysis_config(args)?;
        let collaborators = load_collaborators(args)?;

        let report = Pipeline::new(analysis)
            .with_collaborators(collaborators)
            .run(&text)?;

        match args.format {
            OutputFormat::Text => Ok(render_report(&report)),
            OutputFormat::Json => {
                serde_json::to_string_pretty(&report).map_err(|e| CliError::Parse(e.to_string()))
            }
        }
    }

    /// Show or initialize the configuration file.
    pub fn handle_config(&self, args: &ConfigArgs) -> Result<String> {
        match &args.command {
            ConfigCommand::Show => toml::to_string_pretty(&self.config)
                .map_err(|e| CliError::Parse(format!("Failed to serialize config: {}", e))),
            ConfigCommand::Init { force } => {
                let path = self.config_path.as_ref().ok_or_else(|| {
                    CliError::Config("no configuration directory on this platform".to_string())
                })?;
                if path.exists() && !force {
                    return Err(CliError::Config(format!(
                        "{} already exists (use --force to overwrite)",
                        path.display()
                    )));
                }
                ChatpulseConfig::default().save(path)?;
                Ok(format!("Wrote default configuration to {}", path.display()))
            }
        }
    }

    /// Merge command-line overrides into the configured analysis settings.
    fn analysis_config(&self, args: &AnalyzeArgs) -> Result<AnalysisConfig> {
        let mut analysis = self.config.analysis.clone();
        if let Some(window) = args.window {
            if window < 0 {
                return Err(CliError::Argument(format!(
                    "window must be non-negative, got {}",
                    window
                )));
            }
            analysis.engagement_window_minutes = window;
        }
        if let Some(path) = &args.weights {
            analysis.weights = read_json::<ScoreWeights>(path)?;
        }
        if args.sequential {
            analysis.parallel = false;
        }
        debug!("Analysis settings: {:?}", analysis);
        Ok(analysis)
    }
}

fn level_filter(level: LogLevel) -> log::LevelFilter {
    match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Warn => log::LevelFilter::Warn,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
        LogLevel::Trace => log::LevelFilter::Trace,
    }
}

fn read_transcript(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(CliError::Argument(format!(
            "input path not found: {}",
            path.display()
        )));
    }
    fs::read_to_string(path)
        .map_err(|e| CliError::FileSystem(format!("failed to read {}: {}", path.display(), e)))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = fs::read_to_string(path)
        .map_err(|e| CliError::FileSystem(format!("failed to read {}: {}", path.display(), e)))?;
    serde_json::from_str(&raw)
        .map_err(|e| CliError::Parse(format!("invalid JSON in {}: {}", path.display(), e)))
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Build collaborators that replay outputs stored in JSON files.
pub fn load_collaborators(args: &AnalyzeArgs) -> Result<Collaborators> {
    let mut collaborators = Collaborators::new();
    if let Some(path) = &args.embeddings {
        let vectors: Vec<Vec<f32>> = read_json(path)?;
        collaborators = collaborators
            .with_embedder(Arc::new(PrecomputedEmbeddings::new(source_name(path), vectors)));
    }
    if let Some(path) = &args.emotions {
        let predictions: Vec<LabelPrediction> = read_json(path)?;
        collaborators = collaborators
            .with_emotion_classifier(Arc::new(PrecomputedLabels::new(source_name(path), predictions)));
    }
    if let Some(path) = &args.message_types {
        let predictions: Vec<LabelPrediction> = read_json(path)?;
        collaborators = collaborators.with_message_type_classifier(Arc::new(
            PrecomputedLabels::new(source_name(path), predictions),
        ));
    }
    if let Some(path) = &args.topics {
        let assignment: TopicAssignment = read_json(path)?;
        collaborators = collaborators
            .with_topic_discoverer(Arc::new(PrecomputedTopics::new(source_name(path), assignment)));
    }
    Ok(collaborators)
}

/// Render parsed messages one per line, continuation lines indented.
pub fn render_messages(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        let mut lines = message.content.lines();
        let first = lines.next().unwrap_or_default();
        let _ = writeln!(
            out,
            "#{:<4} {}  {}: {}",
            message.index,
            message.timestamp.format("%Y-%m-%d %H:%M:%S"),
            message.sender,
            first
        );
        for line in lines {
            let _ = writeln!(out, "      {}", line);
        }
    }
    let _ = write!(out, "{} messages", messages.len());
    out
}

/// Render an analysis report as plain text.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Messages: {}", report.num_messages);
    let _ = writeln!(out, "Users: {}", report.num_users);

    let _ = writeln!(out, "\nParticipants");
    for user in &report.users {
        let _ = writeln!(
            out,
            "  {:<20} msgs={} words={} avg_len={:.1} vocab={:.2} replies={} starts={} asked={} answered={} code={} links={} engagers={}",
            user.name,
            user.message_count,
            user.total_words,
            user.avg_msg_len,
            user.vocab_richness,
            user.replies_triggered,
            user.conversation_starts,
            user.questions_asked,
            user.questions_answered,
            user.code_snippets,
            user.links_shared,
            user.unique_engagers
        );
    }

    let _ = writeln!(out, "\nInteractions");
    if report.edges.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for edge in &report.edges {
        let _ = writeln!(out, "  {} -> {} ({})", edge.source, edge.target, edge.weight);
    }

    let _ = writeln!(out, "\nCentrality");
    for (name, stats) in &report.centrality {
        let _ = writeln!(
            out,
            "  {:<20} betweenness={:.3} eigenvector={:.3} in={} out={}",
            name, stats.betweenness, stats.eigenvector, stats.in_degree, stats.out_degree
        );
    }

    let _ = writeln!(out, "\nValue scores");
    let mut ranked: Vec<(&String, &f64)> = report.value_scores.iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (name, score) in ranked {
        let _ = writeln!(out, "  {:<20} {:>6.2}", name, score);
    }

    render_scores(&mut out, "Uniqueness", &report.uniqueness);
    render_scores(&mut out, "Influence", &report.influence);

    render_labels(&mut out, "Emotions", &report.emotion_sample);
    render_labels(&mut out, "Message types", &report.message_type_sample);
    let _ = writeln!(out, "\nTopics");
    match &report.topic_sample {
        Feature::Available { value } => {
            for (id, name) in value {
                let _ = writeln!(out, "  {:>3}  {}", id, name);
            }
        }
        Feature::Unavailable { reason } => {
            let _ = writeln!(out, "  unavailable: {}", reason);
        }
    }
    out.trim_end().to_string()
}

fn render_scores(out: &mut String, title: &str, scores: &Feature<BTreeMap<String, f64>>) {
    let _ = writeln!(out, "\n{}", title);
    match scores {
        Feature::Available { value } => {
            for (name, score) in value {
                let _ = writeln!(out, "  {:<20} {:.4}", name, score);
            }
        }
        Feature::Unavailable { reason } => {
            let _ = writeln!(out, "  unavailable: {}", reason);
        }
    }
}

fn render_labels(out: &mut String, title: &str, sample: &Feature<Vec<LabelPrediction>>) {
    let _ = writeln!(out, "\n{}", title);
    match sample {
        Feature::Available { value } => {
            for prediction in value {
                let _ = writeln!(out, "  {:<20} {:.2}", prediction.label, prediction.score);
            }
        }
        Feature::Unavailable { reason } => {
            let _ = writeln!(out, "  unavailable: {}", reason);
        }
    }
}

/// Run the CLI application.
pub fn run() -> Result<()> {
    let app = App::new()?;
    app.run()
}
