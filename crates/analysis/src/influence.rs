use crate::error::{ensure_aligned, AnalysisResult};
use chatpulse_core::Message;
use std::collections::BTreeMap;

/// Cosine similarity of two vectors over their shared prefix.
///
/// A zero-norm vector is similar to nothing: the result is 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let len = a.len().min(b.len());
    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a[..len].iter().zip(&b[..len]) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Running per-sender sum and count.
#[derive(Default)]
struct SenderTally {
    total: f64,
    count: usize,
}

fn average_by_sender(tallies: BTreeMap<String, SenderTally>) -> BTreeMap<String, f64> {
    tallies
        .into_iter()
        .map(|(sender, tally)| (sender, tally.total / tally.count.max(1) as f64))
        .collect()
}

/// Average novelty of each sender's messages against the recent conversation.
///
/// Message 0 contributes 1.0. Message `i` contributes
/// `1 - cos(e[i], mean(e[max(0, i - window)..i]))`.
pub fn calculate_uniqueness(
    messages: &[Message],
    embeddings: &[Vec<f32>],
    window: usize,
) -> AnalysisResult<BTreeMap<String, f64>> {
    ensure_aligned(messages.len(), embeddings.len())?;
    let dimension = embeddings.iter().map(Vec::len).max().unwrap_or(0);
    let mut window_sum = vec![0.0_f64; dimension];
    let mut window_len = 0usize;
    let mut tallies: BTreeMap<String, SenderTally> = BTreeMap::new();

    for (i, (message, embedding)) in messages.iter().zip(embeddings).enumerate() {
        let contribution = if window_len == 0 {
            1.0
        } else {
            let mean: Vec<f32> = window_sum
                .iter()
                .map(|sum| (sum / window_len as f64) as f32)
                .collect();
            1.0 - cosine_similarity(embedding, &mean)
        };

        let tally = tallies.entry(message.sender.clone()).or_default();
        tally.total += contribution;
        tally.count += 1;

        add_into(&mut window_sum, embedding, 1.0);
        window_len += 1;
        if i >= window {
            add_into(&mut window_sum, &embeddings[i - window], -1.0);
            window_len -= 1;
        }
    }

    Ok(average_by_sender(tallies))
}

fn add_into(sum: &mut [f64], vector: &[f32], sign: f64) {
    for (slot, &value) in sum.iter_mut().zip(vector) {
        *slot += sign * f64::from(value);
    }
}

/// Average echo each sender's messages receive from other participants.
///
/// For message `i`, sums `max(0, cos(e[i], e[j]))` over the next
/// `reply_window` messages `j` from a different sender.
pub fn calculate_idea_influence(
    messages: &[Message],
    embeddings: &[Vec<f32>],
    reply_window: usize,
) -> AnalysisResult<BTreeMap<String, f64>> {
    ensure_aligned(messages.len(), embeddings.len())?;
    let mut tallies: BTreeMap<String, SenderTally> = BTreeMap::new();

    for (i, message) in messages.iter().enumerate() {
        let end = messages.len().min(i + 1 + reply_window);
        let echo: f64 = (i + 1..end)
            .filter(|&j| messages[j].sender != message.sender)
            .map(|j| cosine_similarity(&embeddings[i], &embeddings[j]).max(0.0))
            .sum();

        let tally = tallies.entry(message.sender.clone()).or_default();
        tally.total += echo;
        tally.count += 1;
    }

    Ok(average_by_sender(tallies))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use chrono::NaiveDate;

    fn conversation(senders: &[&str]) -> Vec<Message> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .expect("valid time");
        senders
            .iter()
            .enumerate()
            .map(|(index, sender)| Message {
                timestamp: start + chrono::Duration::minutes(index as i64),
                sender: sender.to_string(),
                content: format!("message {}", index),
                index,
            })
            .collect()
    }

    fn random_unit_vectors(count: usize, dimension: usize, seed: u64) -> Vec<Vec<f32>> {
        let mut rng = fastrand::Rng::with_seed(seed);
        (0..count)
            .map(|_| {
                let raw: Vec<f32> = (0..dimension).map(|_| rng.f32() * 2.0 - 1.0).collect();
                let norm = raw.iter().map(|v| v * v).sum::<f32>().sqrt().max(f32::EPSILON);
                raw.into_iter().map(|v| v / norm).collect()
            })
            .collect()
    }

    #[test]
    fn cosine_handles_identity_orthogonality_and_zero_vectors() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn identical_vectors_have_no_novelty_after_the_first_message() {
        let messages = conversation(&["A", "B", "A", "B"]);
        let embeddings = vec![vec![0.6, 0.8]; 4];
        let uniqueness = calculate_uniqueness(&messages, &embeddings, 50).expect("aligned");
        // A: (1.0 + 0.0) / 2, B: 0.0
        assert!((uniqueness["A"] - 0.5).abs() < 1e-6);
        assert!(uniqueness["B"].abs() < 1e-6);
    }

    #[test]
    fn uniqueness_window_forgets_old_context() {
        let messages = conversation(&["A", "B", "C"]);
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0]];
        let uniqueness = calculate_uniqueness(&messages, &embeddings, 1).expect("aligned");
        // C is compared only to B's orthogonal vector.
        assert!((uniqueness["C"] - 1.0).abs() < 1e-6);

        let uniqueness = calculate_uniqueness(&messages, &embeddings, 50).expect("aligned");
        // Against the mean of A and B, cos = 1/sqrt(2).
        let expected = 1.0 - 1.0 / 2.0_f64.sqrt();
        assert!((uniqueness["C"] - expected).abs() < 1e-6);
    }

    #[test]
    fn identical_vectors_echo_once_per_other_sender_in_range() {
        let messages = conversation(&["A", "B", "A", "B"]);
        let embeddings = vec![vec![1.0, 1.0]; 4];
        let influence = calculate_idea_influence(&messages, &embeddings, 10).expect("aligned");
        // A@0 sees B@1, B@3 -> 2; A@2 sees B@3 -> 1. B@1 sees A@2 -> 1; B@3 -> 0.
        assert!((influence["A"] - 1.5).abs() < 1e-6);
        assert!((influence["B"] - 0.5).abs() < 1e-6);

        let influence = calculate_idea_influence(&messages, &embeddings, 1).expect("aligned");
        assert!((influence["A"] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn contradiction_does_not_count_as_influence() {
        let messages = conversation(&["A", "B"]);
        let embeddings = vec![vec![1.0, 0.0], vec![-1.0, 0.0]];
        let influence = calculate_idea_influence(&messages, &embeddings, 10).expect("aligned");
        assert_eq!(influence["A"], 0.0);
    }

    #[test]
    fn misaligned_embeddings_are_rejected() {
        let messages = conversation(&["A", "B", "C"]);
        let embeddings = vec![vec![1.0]; 2];
        assert!(matches!(
            calculate_uniqueness(&messages, &embeddings, 50),
            Err(AnalysisError::Misaligned {
                expected: 3,
                actual: 2
            })
        ));
        assert!(calculate_idea_influence(&messages, &embeddings, 10).is_err());
    }

    #[test]
    fn random_embeddings_stay_in_expected_ranges() {
        let senders: Vec<&str> = (0..120).map(|i| ["A", "B", "C"][i % 3]).collect();
        let messages = conversation(&senders);
        let embeddings = random_unit_vectors(messages.len(), 16, 42);

        let uniqueness = calculate_uniqueness(&messages, &embeddings, 50).expect("aligned");
        for score in uniqueness.values() {
            assert!((-1e-9..=2.0 + 1e-9).contains(score), "uniqueness {}", score);
        }

        let influence = calculate_idea_influence(&messages, &embeddings, 10).expect("aligned");
        for score in influence.values() {
            assert!((0.0..=10.0 + 1e-9).contains(score), "influence {}", score);
        }
    }

    #[test]
    fn empty_conversation_yields_empty_maps() {
        assert!(calculate_uniqueness(&[], &[], 50).expect("aligned").is_empty());
        assert!(calculate_idea_influence(&[], &[], 10).expect("aligned").is_empty());
    }
}
