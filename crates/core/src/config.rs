use crate::constants::*;
use crate::Error;
use crate::Result;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Main configuration for Chatpulse.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatpulseConfig {
    /// Analysis pipeline configuration.
    pub analysis: AnalysisConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Analysis pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Time span within which a later message counts as a reply, in minutes.
    pub engagement_window_minutes: i64,

    /// Preceding messages averaged when scoring uniqueness.
    pub uniqueness_window: usize,

    /// Following messages inspected for idea influence.
    pub reply_window: usize,

    /// Collaborator predictions echoed into the report.
    pub sample_size: usize,

    /// Run the graph builder and the influence engine concurrently.
    pub parallel: bool,

    /// Value-score weights. A weights table replaces the defaults entirely.
    pub weights: ScoreWeights,
}

/// Weights of the nine value-score dimensions.
///
/// `Default` yields the built-in weights. When deserialized, any dimension
/// missing from the input weighs 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreWeights {
    #[serde(default)]
    pub replies_triggered: f64,
    #[serde(default)]
    pub conversation_starts: f64,
    #[serde(default)]
    pub questions_asked: f64,
    #[serde(default)]
    pub questions_answered: f64,
    #[serde(default)]
    pub code_snippets: f64,
    #[serde(default)]
    pub links_shared: f64,
    #[serde(default)]
    pub total_words: f64,
    #[serde(default)]
    pub vocab_richness: f64,
    #[serde(default)]
    pub unique_engagers: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no verbosity flag is given.
    pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level.
    Error,

    /// Warning level.
    Warn,

    /// Info level.
    Info,

    /// Debug level.
    Debug,

    /// Trace level.
    Trace,
}

impl ChatpulseConfig {
    /// Default configuration file location, if the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load configuration from file.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::FileSystem(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Parse(format!("Failed to parse config: {}", e)))?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Parse(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)
            .map_err(|e| Error::FileSystem(format!("Failed to write config file: {}", e)))
    }
}

impl AnalysisConfig {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.engagement_window_minutes < 0 {
            return Err(Error::validation(format!(
                "engagement_window_minutes must be non-negative, got {}",
                self.engagement_window_minutes
            )));
        }
        self.engagement_window()?;
        if self.uniqueness_window == 0 {
            return Err(Error::validation("uniqueness_window must be at least 1"));
        }
        for (dimension, weight) in self.weights.entries() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::validation(format!(
                    "weight {} must be a finite non-negative number, got {}",
                    dimension, weight
                )));
            }
        }
        Ok(())
    }

    /// Engagement window as a duration.
    pub fn engagement_window(&self) -> Result<Duration> {
        Duration::try_minutes(self.engagement_window_minutes).ok_or_else(|| {
            Error::validation(format!(
                "engagement_window_minutes out of range, got {}",
                self.engagement_window_minutes
            ))
        })
    }
}

impl ScoreWeights {
    /// Dimension names paired with their weights.
    pub fn entries(&self) -> [(&'static str, f64); 9] {
        [
            ("replies_triggered", self.replies_triggered),
            ("conversation_starts", self.conversation_starts),
            ("questions_asked", self.questions_asked),
            ("questions_answered", self.questions_answered),
            ("code_snippets", self.code_snippets),
            ("links_shared", self.links_shared),
            ("total_words", self.total_words),
            ("vocab_richness", self.vocab_richness),
            ("unique_engagers", self.unique_engagers),
        ]
    }

    /// Weights with every dimension at 0.
    pub fn zeroed() -> Self {
        Self {
            replies_triggered: 0.0,
            conversation_starts: 0.0,
            questions_asked: 0.0,
            questions_answered: 0.0,
            code_snippets: 0.0,
            links_shared: 0.0,
            total_words: 0.0,
            vocab_richness: 0.0,
            unique_engagers: 0.0,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            engagement_window_minutes: DEFAULT_ENGAGEMENT_WINDOW_MINUTES,
            uniqueness_window: DEFAULT_UNIQUENESS_WINDOW,
            reply_window: DEFAULT_REPLY_WINDOW,
            sample_size: DEFAULT_SAMPLE_SIZE,
            parallel: true,
            weights: ScoreWeights::default(),
        }
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            replies_triggered: DEFAULT_WEIGHT_REPLIES_TRIGGERED,
            conversation_starts: DEFAULT_WEIGHT_CONVERSATION_STARTS,
            questions_asked: DEFAULT_WEIGHT_QUESTIONS_ASKED,
            questions_answered: DEFAULT_WEIGHT_QUESTIONS_ANSWERED,
            code_snippets: DEFAULT_WEIGHT_CODE_SNIPPETS,
            links_shared: DEFAULT_WEIGHT_LINKS_SHARED,
            total_words: DEFAULT_WEIGHT_TOTAL_WORDS,
            vocab_richness: DEFAULT_WEIGHT_VOCAB_RICHNESS,
            unique_engagers: DEFAULT_WEIGHT_UNIQUE_ENGAGERS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Warn,
        }
    }
}
