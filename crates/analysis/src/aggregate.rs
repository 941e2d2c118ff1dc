use crate::error::{ensure_aligned, AnalysisResult};
use crate::nlp::TextSignals;
use chatpulse_core::{LabelPrediction, Message, UserStats};
use chrono::Duration;
use indexmap::IndexMap;
use tracing::debug;

/// Per-user statistics keyed by exact sender label, in first-appearance order.
pub type UserStatsMap = IndexMap<String, UserStats>;

/// Fold a message sequence into per-user statistics.
///
/// A message counts as a reply when the message right before it came from a
/// different sender no more than `window` earlier. A timestamp that runs
/// backwards never earns reply credit. A message opens a
/// conversation when it is the first one or follows a gap longer than `window`.
pub fn aggregate_users(messages: &[Message], window: Duration) -> UserStatsMap {
    let mut users = UserStatsMap::new();
    let mut previous: Option<(&Message, bool)> = None;

    for message in messages {
        let signals = TextSignals::extract(&message.content);
        let gap = previous.map(|(prev, _)| message.timestamp - prev.timestamp);

        let reply_to = match (previous, gap) {
            (Some((prev, asked)), Some(gap))
                if prev.sender != message.sender && gap >= Duration::zero() && gap <= window =>
            {
                Some((prev.sender.as_str(), asked, gap))
            }
            _ => None,
        };

        if let Some((earlier, _, _)) = reply_to {
            let target = users
                .entry(earlier.to_string())
                .or_insert_with(|| UserStats::new(earlier));
            target.replies_triggered += 1;
            target.unique_engagers.insert(message.sender.clone());
        }

        let stats = users
            .entry(message.sender.clone())
            .or_insert_with(|| UserStats::new(message.sender.as_str()));
        stats.messages.push(message.clone());
        stats.total_words += signals.word_count;
        stats.unique_words.extend(signals.vocabulary);
        if signals.is_question {
            stats.questions_asked += 1;
        }
        if signals.has_code {
            stats.code_snippets += 1;
        }
        stats.links_shared += signals.link_count;
        if gap.map_or(true, |gap| gap > window) {
            stats.conversation_starts += 1;
        }

        match reply_to {
            Some((_, asked, gap)) => {
                stats.response_latencies.push(Some(gap.num_seconds()));
                if asked {
                    stats.questions_answered += 1;
                }
            }
            None => stats.response_latencies.push(None),
        }

        previous = Some((message, signals.is_question));
    }

    debug!(
        "Aggregated {} messages into {} users",
        messages.len(),
        users.len()
    );
    users
}

/// Distribute per-message embeddings to their senders.
pub fn attach_embeddings(
    users: &mut UserStatsMap,
    messages: &[Message],
    embeddings: &[Vec<f32>],
) -> AnalysisResult<()> {
    ensure_aligned(messages.len(), embeddings.len())?;
    for (message, embedding) in messages.iter().zip(embeddings) {
        if let Some(stats) = users.get_mut(&message.sender) {
            stats.msg_embeddings.push(embedding.clone());
        }
    }
    Ok(())
}

/// Distribute per-message type labels to their senders.
pub fn attach_message_types(
    users: &mut UserStatsMap,
    messages: &[Message],
    predictions: &[LabelPrediction],
) -> AnalysisResult<()> {
    ensure_aligned(messages.len(), predictions.len())?;
    for (message, prediction) in messages.iter().zip(predictions) {
        if let Some(stats) = users.get_mut(&message.sender) {
            stats.msg_types.push(prediction.label.clone());
        }
    }
    Ok(())
}

/// Distribute per-message emotion confidences to their senders.
pub fn attach_sentiment(
    users: &mut UserStatsMap,
    messages: &[Message],
    predictions: &[LabelPrediction],
) -> AnalysisResult<()> {
    ensure_aligned(messages.len(), predictions.len())?;
    for (message, prediction) in messages.iter().zip(predictions) {
        if let Some(stats) = users.get_mut(&message.sender) {
            stats.sentiment_scores.push(prediction.score);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use chrono::NaiveDate;

    fn message(index: usize, minute: u32, sender: &str, content: &str) -> Message {
        Message {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|d| d.and_hms_opt(10, minute, 0))
                .expect("valid time"),
            sender: sender.to_string(),
            content: content.to_string(),
            index,
        }
    }

    fn window() -> Duration {
        Duration::minutes(30)
    }

    #[test]
    fn users_are_kept_in_first_appearance_order() {
        let messages = vec![
            message(0, 0, "Zed", "hi"),
            message(1, 1, "Amy", "hello"),
            message(2, 2, "Zed", "ok"),
        ];
        let users = aggregate_users(&messages, window());
        let names: Vec<&String> = users.keys().collect();
        assert_eq!(names, vec!["Zed", "Amy"]);
        assert_eq!(users["Zed"].message_count(), 2);
    }

    #[test]
    fn replies_credit_the_earlier_sender() {
        let messages = vec![
            message(0, 0, "Alice", "anyone around?"),
            message(1, 2, "Bob", "yes"),
            message(2, 3, "Carol", "me too"),
        ];
        let users = aggregate_users(&messages, window());
        assert_eq!(users["Alice"].replies_triggered, 1);
        assert_eq!(users["Bob"].replies_triggered, 1);
        assert!(users["Alice"].unique_engagers.contains("Bob"));
        assert_eq!(users["Bob"].questions_answered, 1);
        assert_eq!(users["Carol"].questions_answered, 0);
        assert_eq!(users["Bob"].response_latencies, vec![Some(120)]);
        assert_eq!(users["Alice"].response_latencies, vec![None]);
    }

    #[test]
    fn consecutive_messages_by_one_sender_are_not_replies() {
        let messages = vec![message(0, 0, "Alice", "one"), message(1, 1, "Alice", "two")];
        let users = aggregate_users(&messages, window());
        assert_eq!(users["Alice"].replies_triggered, 0);
        assert_eq!(users["Alice"].conversation_starts, 1);
    }

    #[test]
    fn silence_longer_than_window_starts_a_new_conversation() {
        let messages = vec![
            message(0, 0, "Alice", "morning"),
            message(1, 45, "Bob", "afternoon"),
        ];
        let users = aggregate_users(&messages, window());
        assert_eq!(users["Alice"].conversation_starts, 1);
        assert_eq!(users["Bob"].conversation_starts, 1);
        assert_eq!(users["Alice"].replies_triggered, 0);
    }

    #[test]
    fn backwards_timestamp_is_not_a_reply() {
        let messages = vec![
            message(0, 10, "Alice", "later clock"),
            message(1, 5, "Bob", "earlier clock"),
        ];
        let users = aggregate_users(&messages, window());
        assert_eq!(users["Alice"].replies_triggered, 0);
        assert!(users["Alice"].unique_engagers.is_empty());
        assert_eq!(users["Bob"].response_latencies, vec![None]);
        assert_eq!(users["Bob"].conversation_starts, 0);
    }

    #[test]
    fn content_signals_are_counted() {
        let messages = vec![message(
            0,
            0,
            "Dev",
            "Fix is in https://git.example/pr/1?\n```\nlet x = 1;\n```",
        )];
        let users = aggregate_users(&messages, window());
        let dev = &users["Dev"];
        assert_eq!(dev.questions_asked, 1);
        assert_eq!(dev.code_snippets, 1);
        assert_eq!(dev.links_shared, 1);
        assert!(dev.total_words > 0);
        assert!(dev.unique_words.contains("fix"));
    }

    #[test]
    fn collaborator_outputs_follow_their_senders() {
        let messages = vec![
            message(0, 0, "Alice", "hi"),
            message(1, 1, "Bob", "hello"),
            message(2, 2, "Alice", "bye"),
        ];
        let mut users = aggregate_users(&messages, window());
        let embeddings = vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]];
        attach_embeddings(&mut users, &messages, &embeddings).expect("aligned");
        assert_eq!(users["Alice"].msg_embeddings.len(), 2);
        assert_eq!(users["Bob"].msg_embeddings, vec![vec![0.0, 1.0]]);

        let labels: Vec<LabelPrediction> = ["greeting", "greeting", "farewell"]
            .iter()
            .zip([0.9_f32, 0.8, 0.7])
            .map(|(label, score)| LabelPrediction {
                label: label.to_string(),
                score,
            })
            .collect();
        attach_message_types(&mut users, &messages, &labels).expect("aligned");
        attach_sentiment(&mut users, &messages, &labels).expect("aligned");
        assert_eq!(users["Alice"].msg_types, vec!["greeting", "farewell"]);
        assert_eq!(users["Alice"].sentiment_scores, vec![0.9, 0.7]);
    }

    #[test]
    fn misaligned_collaborator_output_is_rejected() {
        let messages = vec![message(0, 0, "Alice", "hi"), message(1, 1, "Bob", "yo")];
        let mut users = aggregate_users(&messages, window());
        let err = attach_embeddings(&mut users, &messages, &[vec![1.0]])
            .expect_err("one vector for two messages");
        assert!(matches!(
            err,
            AnalysisError::Misaligned {
                expected: 2,
                actual: 1
            }
        ));
        assert!(users["Alice"].msg_embeddings.is_empty());
    }
}
