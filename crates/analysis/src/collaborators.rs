use crate::error::{ensure_aligned, AnalysisError, AnalysisResult};
use chatpulse_core::{Feature, LabelPrediction, TopicAssignment};
use std::sync::Arc;
use tracing::{debug, warn};

/// Trait for text embedding models.
pub trait Embedder: Send + Sync {
    /// Generate one embedding per text.
    fn embed(&self, texts: &[String]) -> AnalysisResult<Vec<Vec<f32>>>;

    /// Get embedding dimension.
    fn dimension(&self) -> usize;

    /// Get model name.
    fn name(&self) -> &str;
}

/// Trait for per-message classifiers (emotion, zero-shot message type).
pub trait MessageClassifier: Send + Sync {
    /// Predict one label per text.
    fn classify(&self, texts: &[String]) -> AnalysisResult<Vec<LabelPrediction>>;

    /// Get model name.
    fn name(&self) -> &str;
}

/// Trait for topic discovery over texts and their embeddings.
pub trait TopicDiscoverer: Send + Sync {
    /// Assign a topic id to every text and name each topic.
    fn discover(&self, texts: &[String], embeddings: &[Vec<f32>]) -> AnalysisResult<TopicAssignment>;

    /// Get model name.
    fn name(&self) -> &str;
}

/// Optional model capabilities consulted by the pipeline.
///
/// Each capability is called at most once per run. An absent capability, a
/// failing call, or output that is not one entry per message all yield an
/// unavailable feature with a reason; none of them aborts the run.
#[derive(Clone, Default)]
pub struct Collaborators {
    embedder: Option<Arc<dyn Embedder>>,
    emotion_classifier: Option<Arc<dyn MessageClassifier>>,
    message_type_classifier: Option<Arc<dyn MessageClassifier>>,
    topic_discoverer: Option<Arc<dyn TopicDiscoverer>>,
}

impl Collaborators {
    /// No capabilities.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use an embedding model.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Use an emotion classifier.
    pub fn with_emotion_classifier(mut self, classifier: Arc<dyn MessageClassifier>) -> Self {
        self.emotion_classifier = Some(classifier);
        self
    }

    /// Use a zero-shot message-type classifier.
    pub fn with_message_type_classifier(mut self, classifier: Arc<dyn MessageClassifier>) -> Self {
        self.message_type_classifier = Some(classifier);
        self
    }

    /// Use a topic discoverer.
    pub fn with_topic_discoverer(mut self, discoverer: Arc<dyn TopicDiscoverer>) -> Self {
        self.topic_discoverer = Some(discoverer);
        self
    }

    /// Embed message bodies.
    pub fn embed(&self, texts: &[String]) -> Feature<Vec<Vec<f32>>> {
        let Some(model) = &self.embedder else {
            return Feature::unavailable("no embedding model configured");
        };
        debug!("Embedding {} messages with {}", texts.len(), model.name());
        let dimension = model.dimension();
        let result = model.embed(texts).and_then(|vectors| {
            match vectors.iter().find(|v| v.len() != dimension) {
                Some(bad) => Err(AnalysisError::Collaborator(format!(
                    "{} declared dimension {} but produced a vector of length {}",
                    model.name(),
                    dimension,
                    bad.len()
                ))),
                None => Ok(vectors),
            }
        });
        settle("embedding", texts.len(), result, Vec::len)
    }

    /// Classify message emotions.
    pub fn classify_emotions(&self, texts: &[String]) -> Feature<Vec<LabelPrediction>> {
        let Some(model) = &self.emotion_classifier else {
            return Feature::unavailable("no emotion classifier configured");
        };
        debug!("Classifying emotions of {} messages with {}", texts.len(), model.name());
        settle("emotion classification", texts.len(), model.classify(texts), Vec::len)
    }

    /// Classify message types.
    pub fn classify_message_types(&self, texts: &[String]) -> Feature<Vec<LabelPrediction>> {
        let Some(model) = &self.message_type_classifier else {
            return Feature::unavailable("no message-type classifier configured");
        };
        debug!("Classifying message types of {} messages with {}", texts.len(), model.name());
        settle("message-type classification", texts.len(), model.classify(texts), Vec::len)
    }

    /// Discover topics. Needs the embeddings of the same messages.
    pub fn discover_topics(
        &self,
        texts: &[String],
        embeddings: &Feature<Vec<Vec<f32>>>,
    ) -> Feature<TopicAssignment> {
        let Some(model) = &self.topic_discoverer else {
            return Feature::unavailable("no topic model configured");
        };
        let Some(embeddings) = embeddings.value() else {
            return Feature::unavailable("topic discovery needs message embeddings");
        };
        debug!("Discovering topics over {} messages with {}", texts.len(), model.name());
        settle(
            "topic discovery",
            texts.len(),
            model.discover(texts, embeddings),
            |assignment: &TopicAssignment| assignment.topics.len(),
        )
    }
}

/// Turn a collaborator result into a feature, checking it covers every message.
fn settle<T>(
    capability: &str,
    expected: usize,
    result: AnalysisResult<T>,
    len: impl Fn(&T) -> usize,
) -> Feature<T> {
    let checked = result.and_then(|value| {
        ensure_aligned(expected, len(&value))?;
        Ok(value)
    });
    match checked {
        Ok(value) => Feature::available(value),
        Err(e) => {
            warn!("Skipping {}: {}", capability, e);
            Feature::unavailable(format!("{} failed: {}", capability, e))
        }
    }
}

/// Embeddings computed ahead of time, replayed in message order.
#[derive(Debug, Clone)]
pub struct PrecomputedEmbeddings {
    name: String,
    vectors: Vec<Vec<f32>>,
}

impl PrecomputedEmbeddings {
    /// Wrap vectors produced by an external model.
    pub fn new(name: impl Into<String>, vectors: Vec<Vec<f32>>) -> Self {
        Self {
            name: name.into(),
            vectors,
        }
    }
}

impl Embedder for PrecomputedEmbeddings {
    fn embed(&self, texts: &[String]) -> AnalysisResult<Vec<Vec<f32>>> {
        ensure_aligned(texts.len(), self.vectors.len())?;
        Ok(self.vectors.clone())
    }

    fn dimension(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Labels computed ahead of time, replayed in message order.
#[derive(Debug, Clone)]
pub struct PrecomputedLabels {
    name: String,
    predictions: Vec<LabelPrediction>,
}

impl PrecomputedLabels {
    /// Wrap predictions produced by an external classifier.
    pub fn new(name: impl Into<String>, predictions: Vec<LabelPrediction>) -> Self {
        Self {
            name: name.into(),
            predictions,
        }
    }
}

impl MessageClassifier for PrecomputedLabels {
    fn classify(&self, texts: &[String]) -> AnalysisResult<Vec<LabelPrediction>> {
        ensure_aligned(texts.len(), self.predictions.len())?;
        Ok(self.predictions.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Topic assignment computed ahead of time.
#[derive(Debug, Clone)]
pub struct PrecomputedTopics {
    name: String,
    assignment: TopicAssignment,
}

impl PrecomputedTopics {
    /// Wrap an assignment produced by an external topic model.
    pub fn new(name: impl Into<String>, assignment: TopicAssignment) -> Self {
        Self {
            name: name.into(),
            assignment,
        }
    }
}

impl TopicDiscoverer for PrecomputedTopics {
    fn discover(&self, texts: &[String], _embeddings: &[Vec<f32>]) -> AnalysisResult<TopicAssignment> {
        ensure_aligned(texts.len(), self.assignment.topics.len())?;
        Ok(self.assignment.clone())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
