//! Analysis defaults and fixed tuning values.

/// Application directory name under the platform config directory.
pub const APP_DIR_NAME: &str = "chatpulse";

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default engagement window for reply inference, in minutes.
pub const DEFAULT_ENGAGEMENT_WINDOW_MINUTES: i64 = 30;

/// Default number of preceding messages averaged when scoring uniqueness.
pub const DEFAULT_UNIQUENESS_WINDOW: usize = 50;

/// Default number of following messages inspected for idea influence.
pub const DEFAULT_REPLY_WINDOW: usize = 10;

/// Number of collaborator predictions echoed into a report.
pub const DEFAULT_SAMPLE_SIZE: usize = 5;

/// Power-iteration cap for eigenvector centrality.
pub const EIGENVECTOR_MAX_ITERATIONS: usize = 100;

/// Per-node L1 convergence tolerance for eigenvector centrality.
pub const EIGENVECTOR_TOLERANCE: f64 = 1.0e-6;

/// Default value-score weights, in dimension order.
pub const DEFAULT_WEIGHT_REPLIES_TRIGGERED: f64 = 2.0;
pub const DEFAULT_WEIGHT_CONVERSATION_STARTS: f64 = 1.5;
pub const DEFAULT_WEIGHT_QUESTIONS_ASKED: f64 = 1.0;
pub const DEFAULT_WEIGHT_QUESTIONS_ANSWERED: f64 = 3.0;
pub const DEFAULT_WEIGHT_CODE_SNIPPETS: f64 = 4.0;
pub const DEFAULT_WEIGHT_LINKS_SHARED: f64 = 2.0;
pub const DEFAULT_WEIGHT_TOTAL_WORDS: f64 = 0.1;
pub const DEFAULT_WEIGHT_VOCAB_RICHNESS: f64 = 2.0;
pub const DEFAULT_WEIGHT_UNIQUE_ENGAGERS: f64 = 1.5;
