use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

static URL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("URL pattern is valid"));

const CODE_FENCE: &str = "```";

/// Surface features of one message body used by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextSignals {
    /// Number of words.
    pub word_count: u64,
    /// Lowercased words, in order of appearance.
    pub vocabulary: Vec<String>,
    /// Whether the message asks something.
    pub is_question: bool,
    /// Whether the message carries a fenced code block.
    pub has_code: bool,
    /// Number of http(s) links.
    pub link_count: u64,
}

impl TextSignals {
    /// Extract signals from a message body.
    pub fn extract(text: &str) -> Self {
        let vocabulary: Vec<String> = words(text).map(str::to_lowercase).collect();
        Self {
            word_count: vocabulary.len() as u64,
            vocabulary,
            is_question: is_question(text),
            has_code: text.contains(CODE_FENCE),
            link_count: URL_PATTERN.find_iter(text).count() as u64,
        }
    }
}

/// Words of a text split on Unicode word boundaries.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.unicode_words()
}

/// Whether a message contains a question mark (ASCII or full-width).
pub fn is_question(text: &str) -> bool {
    text.contains('?') || text.contains('？')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_counts_words_and_lowercases_vocabulary() {
        let signals = TextSignals::extract("Hello hello, World!");
        assert_eq!(signals.word_count, 3);
        assert_eq!(signals.vocabulary, vec!["hello", "hello", "world"]);
        assert!(!signals.is_question);
    }

    #[test]
    fn extract_detects_questions_code_and_links() {
        let text = "see https://docs.rs and http://example.org?\n```rust\nfn main() {}\n```";
        let signals = TextSignals::extract(text);
        assert!(signals.is_question);
        assert!(signals.has_code);
        assert_eq!(signals.link_count, 2);
    }

    #[test]
    fn full_width_question_mark_counts_as_question() {
        assert!(is_question("你好吗？"));
        assert!(!is_question("fine."));
    }
}
