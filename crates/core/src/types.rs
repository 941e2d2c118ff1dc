use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A single message recovered from a chat transcript.
///
/// `index` is the 0-based position in the final (filtered) parse order.
/// Timestamps follow file order and are not guaranteed to be monotonic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Message {
    /// Local wall-clock time of the message; exports carry no time zone.
    pub timestamp: NaiveDateTime,

    /// Sender label exactly as it appears in the export.
    pub sender: String,

    /// Message body, continuation lines joined with `\n`.
    pub content: String,

    /// Position in parse order.
    pub index: usize,
}

/// Per-participant statistics accumulated during one analysis run.
///
/// The per-message lists (`msg_embeddings`, `msg_types`, `sentiment_scores`,
/// `response_latencies`) are index-aligned with `messages` once populated.
#[derive(Debug, Clone, Default)]
pub struct UserStats {
    /// Sender identity.
    pub name: String,

    /// Messages authored by this user, in parse order.
    pub messages: Vec<Message>,

    /// Times another participant replied right after this user.
    pub replies_triggered: u64,

    /// Distinct participants who replied to this user.
    pub unique_engagers: BTreeSet<String>,

    /// Messages that opened a conversation after a silence.
    pub conversation_starts: u64,

    /// Messages containing a question.
    pub questions_asked: u64,

    /// Replies that followed another participant's question.
    pub questions_answered: u64,

    /// Messages carrying a fenced code block.
    pub code_snippets: u64,

    /// Links shared across all messages.
    pub links_shared: u64,

    /// Word count across all messages.
    pub total_words: u64,

    /// Distinct lowercased words.
    pub unique_words: HashSet<String>,

    /// Embedding per message.
    pub msg_embeddings: Vec<Vec<f32>>,

    /// Message-type label per message.
    pub msg_types: Vec<String>,

    /// Emotion confidence per message.
    pub sentiment_scores: Vec<f32>,

    /// Seconds since the message this one replied to, when it was a reply.
    pub response_latencies: Vec<Option<i64>>,
}

impl UserStats {
    /// Create empty statistics for a sender.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Number of messages sent.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Average words per message.
    pub fn avg_msg_len(&self) -> f64 {
        self.total_words as f64 / self.messages.len().max(1) as f64
    }

    /// Distinct words normalized by the square root of the total word count.
    pub fn vocab_richness(&self) -> f64 {
        self.unique_words.len() as f64 / (self.total_words.max(1) as f64).sqrt()
    }

    /// Number of distinct participants who engaged with this user.
    pub fn unique_engager_count(&self) -> usize {
        self.unique_engagers.len()
    }
}

/// Structural position of a participant in the interaction graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CentralityStats {
    /// Weighted betweenness centrality.
    pub betweenness: f64,

    /// Weighted eigenvector centrality (0.0 for every node when it does not converge).
    pub eigenvector: f64,

    /// Sum of incoming edge weights.
    pub in_degree: f64,

    /// Sum of outgoing edge weights.
    pub out_degree: f64,
}

/// A directed "replied to" edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionEdge {
    /// Later speaker.
    pub source: String,

    /// Earlier speaker being replied to.
    pub target: String,

    /// Number of replies inside the engagement window.
    pub weight: f64,
}

/// One label predicted by a classification collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelPrediction {
    /// Predicted label.
    pub label: String,

    /// Confidence score (0.0 to 1.0).
    pub score: f32,
}

/// Topic ids per message plus readable topic names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopicAssignment {
    /// Topic id per message, index-aligned with the message sequence.
    pub topics: Vec<i64>,

    /// Human-readable name per topic id.
    pub names: BTreeMap<i64, String>,
}

/// Output of an optional analysis stage.
///
/// Stages that depend on an absent or failed collaborator report
/// `Unavailable` with a reason instead of being omitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Feature<T> {
    /// The stage ran.
    Available {
        /// Stage output.
        value: T,
    },

    /// The stage was skipped.
    Unavailable {
        /// Why the stage was skipped.
        reason: String,
    },
}

impl<T> Feature<T> {
    /// Wrap a computed value.
    pub fn available(value: T) -> Self {
        Self::Available { value }
    }

    /// Mark a stage as skipped.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Whether the stage ran.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }

    /// Borrow the value if the stage ran.
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Available { value } => Some(value),
            Self::Unavailable { .. } => None,
        }
    }

    /// Transform the value, keeping the unavailability reason.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Feature<U> {
        match self {
            Self::Available { value } => Feature::Available { value: f(value) },
            Self::Unavailable { reason } => Feature::Unavailable { reason },
        }
    }
}

/// Reportable snapshot of a user's counters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub name: String,
    pub message_count: usize,
    pub avg_msg_len: f64,
    pub vocab_richness: f64,
    pub replies_triggered: u64,
    pub conversation_starts: u64,
    pub questions_asked: u64,
    pub questions_answered: u64,
    pub code_snippets: u64,
    pub links_shared: u64,
    pub total_words: u64,
    pub unique_engagers: usize,
}

impl From<&UserStats> for UserSummary {
    fn from(stats: &UserStats) -> Self {
        Self {
            name: stats.name.clone(),
            message_count: stats.message_count(),
            avg_msg_len: stats.avg_msg_len(),
            vocab_richness: stats.vocab_richness(),
            replies_triggered: stats.replies_triggered,
            conversation_starts: stats.conversation_starts,
            questions_asked: stats.questions_asked,
            questions_answered: stats.questions_answered,
            code_snippets: stats.code_snippets,
            links_shared: stats.links_shared,
            total_words: stats.total_words,
            unique_engagers: stats.unique_engager_count(),
        }
    }
}

/// Result bundle of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Messages left after parsing and filtering.
    pub num_messages: usize,

    /// Distinct senders.
    pub num_users: usize,

    /// Per-user counters in first-appearance order.
    pub users: Vec<UserSummary>,

    /// Edges of the interaction graph.
    pub edges: Vec<InteractionEdge>,

    /// Centrality per graph node.
    pub centrality: BTreeMap<String, CentralityStats>,

    /// Normalized value score per user, in `[0, 100]`.
    pub value_scores: BTreeMap<String, f64>,

    /// Average semantic uniqueness per user.
    pub uniqueness: Feature<BTreeMap<String, f64>>,

    /// Average idea influence per user.
    pub influence: Feature<BTreeMap<String, f64>>,

    /// Whether emotion classification ran.
    pub has_emotions: bool,

    /// Whether topic discovery ran.
    pub has_topics: bool,

    /// First few emotion predictions.
    pub emotion_sample: Feature<Vec<LabelPrediction>>,

    /// First few message-type predictions.
    pub message_type_sample: Feature<Vec<LabelPrediction>>,

    /// Topic names by topic id.
    pub topic_sample: Feature<BTreeMap<i64, String>>,
}
