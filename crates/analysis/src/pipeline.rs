use crate::aggregate::{aggregate_users, attach_embeddings, attach_message_types, attach_sentiment};
use crate::collaborators::Collaborators;
use crate::error::{AnalysisError, AnalysisResult};
use crate::graph::compute_graph;
use crate::influence::{calculate_idea_influence, calculate_uniqueness};
use crate::parsers::TranscriptParser;
use crate::scoring::ValueScorer;
use chatpulse_core::{AnalysisConfig, AnalysisReport, Feature, Message, UserSummary};
use std::collections::BTreeMap;
use std::time::Instant;
use tracing::{debug, info};

type SemanticScores = (
    Feature<BTreeMap<String, f64>>,
    Feature<BTreeMap<String, f64>>,
);

/// One analysis run from raw transcript to report.
///
/// A pipeline holds configuration and collaborators only. Every call to
/// [`Pipeline::run`] builds its own statistics, graph and scores.
#[derive(Clone, Default)]
pub struct Pipeline {
    config: AnalysisConfig,
    collaborators: Collaborators,
    parser: TranscriptParser,
}

impl Pipeline {
    /// Creates a pipeline without collaborators.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            collaborators: Collaborators::new(),
            parser: TranscriptParser::new(),
        }
    }

    /// Attach model collaborators.
    pub fn with_collaborators(mut self, collaborators: Collaborators) -> Self {
        self.collaborators = collaborators;
        self
    }

    /// Parse a transcript and analyze it.
    pub fn run(&self, text: &str) -> AnalysisResult<AnalysisReport> {
        let messages = self.parser.parse(text);
        self.analyze(&messages)
    }

    /// Analyze an already parsed message sequence.
    pub fn analyze(&self, messages: &[Message]) -> AnalysisResult<AnalysisReport> {
        self.config.validate()?;
        if messages.is_empty() {
            return Err(AnalysisError::EmptyInput);
        }
        let started = Instant::now();
        let window = self.config.engagement_window()?;

        let mut users = aggregate_users(messages, window);
        let texts: Vec<String> = messages.iter().map(|m| m.content.clone()).collect();

        let embeddings = self.collaborators.embed(&texts);
        if let Some(vectors) = embeddings.value() {
            attach_embeddings(&mut users, messages, vectors)?;
        }
        let emotions = self.collaborators.classify_emotions(&texts);
        if let Some(predictions) = emotions.value() {
            attach_sentiment(&mut users, messages, predictions)?;
        }
        let message_types = self.collaborators.classify_message_types(&texts);
        if let Some(predictions) = message_types.value() {
            attach_message_types(&mut users, messages, predictions)?;
        }
        let topics = self.collaborators.discover_topics(&texts, &embeddings);

        let ((graph, centrality), (uniqueness, influence)) = if self.config.parallel {
            rayon::join(
                || compute_graph(messages, window),
                || semantic_scores(messages, &embeddings, &self.config),
            )
        } else {
            (
                compute_graph(messages, window),
                semantic_scores(messages, &embeddings, &self.config),
            )
        };

        let value_scores = ValueScorer::new(self.config.weights.clone()).compute_scores(&users);
        let sample = self.config.sample_size;

        let report = AnalysisReport {
            num_messages: messages.len(),
            num_users: users.len(),
            users: users.values().map(UserSummary::from).collect(),
            edges: graph.edges(),
            centrality,
            value_scores,
            uniqueness,
            influence,
            has_emotions: emotions.is_available(),
            has_topics: topics.is_available(),
            emotion_sample: emotions.map(|p| p.into_iter().take(sample).collect()),
            message_type_sample: message_types.map(|p| p.into_iter().take(sample).collect()),
            topic_sample: topics.map(|t| t.names),
        };

        info!(
            "Analyzed {} messages from {} users in {:?}",
            report.num_messages,
            report.num_users,
            started.elapsed()
        );
        Ok(report)
    }
}

fn semantic_scores(
    messages: &[Message],
    embeddings: &Feature<Vec<Vec<f32>>>,
    config: &AnalysisConfig,
) -> SemanticScores {
    let vectors = match embeddings {
        Feature::Available { value } => value,
        Feature::Unavailable { reason } => {
            debug!("Skipping uniqueness and influence: {}", reason);
            let reason = format!("requires embeddings: {}", reason);
            return (
                Feature::unavailable(reason.clone()),
                Feature::unavailable(reason),
            );
        }
    };
    let settle = |result: AnalysisResult<BTreeMap<String, f64>>| match result {
        Ok(scores) => Feature::available(scores),
        Err(e) => Feature::unavailable(e.to_string()),
    };
    (
        settle(calculate_uniqueness(messages, vectors, config.uniqueness_window)),
        settle(calculate_idea_influence(messages, vectors, config.reply_window)),
    )
}
