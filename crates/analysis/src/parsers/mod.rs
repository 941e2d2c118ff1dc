use chatpulse_core::Message;
use chrono::NaiveDateTime;
use tracing::{debug, trace};

/// Header rules, date templates and system markers.
pub mod rules;

use rules::{is_system_message, resolve_timestamp, HeaderRule, HEADER_RULES};

/// Counters collected while scanning a transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Lines that opened a new message.
    pub header_lines: usize,
    /// Lines appended to the message in progress.
    pub continuation_lines: usize,
    /// Lines seen before the first header, discarded.
    pub orphan_lines: usize,
    /// Messages dropped by the system-marker filter.
    pub filtered_messages: usize,
}

/// Message being assembled from a header line and its continuations.
#[derive(Debug)]
struct PendingMessage {
    timestamp: NaiveDateTime,
    sender: String,
    content: String,
}

/// Scanner state between lines.
#[derive(Debug)]
enum ScanState {
    /// No header seen yet.
    Idle,
    /// A message is collecting continuation lines.
    Accumulating(PendingMessage),
}

/// Parser for plain-text chat exports.
///
/// Each line is tried against the header rules in priority order. A line that
/// matches a rule and carries a resolvable timestamp opens a new message; any
/// other line continues the message in progress. System notices are removed
/// after the scan and the survivors are renumbered from 0.
#[derive(Debug, Clone, Copy)]
pub struct TranscriptParser {
    rules: &'static [HeaderRule],
}

impl TranscriptParser {
    /// Creates a parser with the default header rules.
    pub fn new() -> Self {
        Self {
            rules: HEADER_RULES.as_slice(),
        }
    }

    /// Parse a transcript into ordered messages.
    pub fn parse(&self, text: &str) -> Vec<Message> {
        self.parse_with_stats(text).0
    }

    /// Parse a transcript and report scan counters.
    pub fn parse_with_stats(&self, text: &str) -> (Vec<Message>, ParseStats) {
        let mut stats = ParseStats::default();
        let mut pending = Vec::new();
        let mut state = ScanState::Idle;

        for line in text.trim().lines() {
            state = match (self.match_header(line), state) {
                (Some(header), ScanState::Idle) => {
                    stats.header_lines += 1;
                    ScanState::Accumulating(header)
                }
                (Some(header), ScanState::Accumulating(done)) => {
                    stats.header_lines += 1;
                    pending.push(done);
                    ScanState::Accumulating(header)
                }
                (None, ScanState::Accumulating(mut current)) => {
                    stats.continuation_lines += 1;
                    current.content.push('\n');
                    current.content.push_str(line);
                    ScanState::Accumulating(current)
                }
                (None, ScanState::Idle) => {
                    stats.orphan_lines += 1;
                    ScanState::Idle
                }
            };
        }
        if let ScanState::Accumulating(last) = state {
            pending.push(last);
        }

        let before_filter = pending.len();
        let messages: Vec<Message> = pending
            .into_iter()
            .filter(|message| !is_system_message(&message.content))
            .enumerate()
            .map(|(index, message)| Message {
                timestamp: message.timestamp,
                sender: message.sender,
                content: message.content,
                index,
            })
            .collect();
        stats.filtered_messages = before_filter - messages.len();

        debug!(
            "Parsed transcript: {} headers, {} continuation lines, {} orphan lines, {} system messages filtered",
            stats.header_lines, stats.continuation_lines, stats.orphan_lines, stats.filtered_messages
        );
        (messages, stats)
    }

    fn match_header(&self, line: &str) -> Option<PendingMessage> {
        let line = line.trim();
        self.rules.iter().find_map(|rule| {
            let fields = rule.captures(line)?;
            let timestamp = resolve_timestamp(fields.date, fields.time)?;
            trace!("Header matched by {} rule", rule.name());
            Some(PendingMessage {
                timestamp,
                sender: fields.sender.trim().to_string(),
                content: fields.content.trim().to_string(),
            })
        })
    }
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_LINE_CHAT: &str = "[01/01/24, 10:00:00] Alice: hi\n[01/01/24, 10:01:00] Bob: hello\n[01/01/24, 10:02:00] Alice: how are you";

    #[test]
    fn parses_bracketed_transcript_in_order() {
        let messages = TranscriptParser::new().parse(THREE_LINE_CHAT);
        assert_eq!(messages.len(), 3);
        let senders: Vec<&str> = messages.iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, vec!["Alice", "Bob", "Alice"]);
        assert_eq!(messages[2].content, "how are you");
        let indices: Vec<usize> = messages.iter().map(|m| m.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn single_header_line_yields_one_message_with_remainder() {
        let messages = TranscriptParser::new().parse("[05/06/2024, 08:30] Carol: just this: nothing more");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, "Carol");
        assert_eq!(messages[0].content, "just this: nothing more");
    }

    #[test]
    fn continuation_lines_join_previous_message_in_source_order() {
        let text = "\
12/01/2024, 09:00 - Dev: here is the fix
```rust
fn main() {}
```
12/01/2024, 09:05 - Ops: thanks
works now";
        let (messages, stats) = TranscriptParser::new().parse_with_stats(text);
        assert_eq!(messages.len(), 2);
        assert_eq!(
            messages[0].content,
            "here is the fix\n```rust\nfn main() {}\n```"
        );
        assert_eq!(messages[1].content, "thanks\nworks now");
        assert_eq!(stats.header_lines, 2);
        assert_eq!(stats.continuation_lines, 4);
    }

    #[test]
    fn lines_before_first_header_are_discarded() {
        let text = "Messages are exported as text\n[01/01/24, 10:00:00] Alice: hi";
        let (messages, stats) = TranscriptParser::new().parse_with_stats(text);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "hi");
        assert_eq!(stats.orphan_lines, 1);
    }

    #[test]
    fn header_with_unresolvable_timestamp_becomes_continuation() {
        let text = "[01/01/24, 10:00:00] Alice: hi\n[31/31/24, 10:01:00] Bob: impossible date";
        let messages = TranscriptParser::new().parse(text);
        assert_eq!(messages.len(), 1);
        assert_eq!(
            messages[0].content,
            "hi\n[31/31/24, 10:01:00] Bob: impossible date"
        );
    }

    #[test]
    fn system_only_transcript_yields_no_messages() {
        let text = "[01/01/24, 10:00:00] Alice: Alice joined using this group's invite link";
        assert!(TranscriptParser::new().parse(text).is_empty());
    }

    #[test]
    fn empty_input_yields_no_messages() {
        assert!(TranscriptParser::new().parse("").is_empty());
        assert!(TranscriptParser::new().parse("   \n\n").is_empty());
    }

    #[test]
    fn filtered_messages_are_renumbered_contiguously() {
        let text = "\
[01/01/24, 10:00:00] Alice: hi
[01/01/24, 10:01:00] Bob: <Media omitted>
[01/01/24, 10:02:00] Carol: morning";
        let (messages, stats) = TranscriptParser::new().parse_with_stats(text);
        assert_eq!(stats.filtered_messages, 1);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].sender, "Carol");
        assert_eq!(messages[1].index, 1);
    }

    #[test]
    fn marker_inside_ordinary_text_is_still_filtered() {
        let text = "[01/01/24, 10:00:00] Alice: I left my keys\n[01/01/24, 10:01:00] Bob: oh no";
        let messages = TranscriptParser::new().parse(text);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, "Bob");
    }

    #[test]
    fn parsing_is_idempotent() {
        let parser = TranscriptParser::new();
        assert_eq!(parser.parse(THREE_LINE_CHAT), parser.parse(THREE_LINE_CHAT));
    }

    #[test]
    fn sender_labels_are_kept_verbatim_apart_from_trimming() {
        let text = "[01/01/24, 10:00:00] alice: hi\n[01/01/24, 10:01:00] Alice : hey";
        let messages = TranscriptParser::new().parse(text);
        assert_eq!(messages[0].sender, "alice");
        assert_eq!(messages[1].sender, "Alice");
    }
}
