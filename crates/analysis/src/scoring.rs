use crate::aggregate::UserStatsMap;
use chatpulse_core::{ScoreWeights, UserStats};
use std::collections::BTreeMap;
use tracing::debug;

/// Weighted value score over nine engagement dimensions.
#[derive(Debug, Clone, Default)]
pub struct ValueScorer {
    weights: ScoreWeights,
}

impl ValueScorer {
    /// Creates a scorer. The weights are used as given; there is no merge
    /// with the built-in defaults.
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Unnormalized weighted sum for one user.
    pub fn raw_score(&self, stats: &UserStats) -> f64 {
        let w = &self.weights;
        stats.replies_triggered as f64 * w.replies_triggered
            + stats.conversation_starts as f64 * w.conversation_starts
            + stats.questions_asked as f64 * w.questions_asked
            + stats.questions_answered as f64 * w.questions_answered
            + stats.code_snippets as f64 * w.code_snippets
            + stats.links_shared as f64 * w.links_shared
            + stats.total_words as f64 * w.total_words
            + stats.vocab_richness() * w.vocab_richness
            + stats.unique_engager_count() as f64 * w.unique_engagers
    }

    /// Scores normalized against the run's best user, in `[0, 100]` with two decimals.
    pub fn compute_scores(&self, users: &UserStatsMap) -> BTreeMap<String, f64> {
        let raw: Vec<(&String, f64)> = users
            .iter()
            .map(|(name, stats)| (name, self.raw_score(stats)))
            .collect();

        let max = raw.iter().map(|(_, score)| *score).fold(0.0_f64, f64::max);
        let denominator = if max == 0.0 { 1.0 } else { max };
        debug!("Scoring {} users, max raw score {:.3}", raw.len(), max);

        raw.into_iter()
            .map(|(name, score)| (name.clone(), round2(score / denominator * 100.0)))
            .collect()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
