//! Header rules, date templates and system markers for plain-text exports.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

/// Fields captured from a message header line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderFields<'a> {
    /// Date token, e.g. `01/02/24`.
    pub date: &'a str,
    /// Time token, e.g. `10:00`, `10:00:00` or `9:05 PM`.
    pub time: &'a str,
    /// Sender label, untrimmed.
    pub sender: &'a str,
    /// Remainder of the line, untrimmed.
    pub content: &'a str,
}

/// A line-start convention that opens a new message.
#[derive(Debug)]
pub struct HeaderRule {
    name: &'static str,
    pattern: Regex,
}

impl HeaderRule {
    /// Compile a rule. The pattern must capture date, time, sender and content in that order.
    pub fn new(name: &'static str, pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            name,
            pattern: Regex::new(pattern)?,
        })
    }

    /// Rule name, for logging.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Match the rule against the start of a line.
    pub fn captures<'a>(&self, line: &'a str) -> Option<HeaderFields<'a>> {
        let caps = self.pattern.captures(line)?;
        Some(HeaderFields {
            date: caps.get(1)?.as_str(),
            time: caps.get(2)?.as_str(),
            sender: caps.get(3)?.as_str(),
            content: caps.get(4)?.as_str(),
        })
    }
}

/// Header conventions in priority order; the first match wins.
pub static HEADER_RULES: Lazy<Vec<HeaderRule>> = Lazy::new(|| {
    [
        (
            "bracketed",
            r"^\[(\d{1,2}/\d{1,2}/\d{2,4}),\s*(\d{1,2}:\d{2}(?::\d{2})?(?:\s*[AP]M)?)\]\s*([^:]+):\s*(.*)",
        ),
        (
            "dash-separated",
            r"^(\d{1,2}/\d{1,2}/\d{2,4}),\s*(\d{1,2}:\d{2}(?::\d{2})?(?:\s*[AP]M)?)\s*[-–]\s*([^:]+):\s*(.*)",
        ),
    ]
    .into_iter()
    .map(|(name, pattern)| HeaderRule::new(name, pattern).expect("header pattern is valid"))
    .collect()
});

/// A date-time format paired with the year width it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTemplate {
    /// chrono format string applied to `"<date> <time>"`.
    pub format: &'static str,
    /// Digits the year token must have for this template to apply.
    pub year_digits: usize,
}

impl DateTemplate {
    const fn new(format: &'static str, year_digits: usize) -> Self {
        Self {
            format,
            year_digits,
        }
    }
}

/// Date templates in priority order; the first that parses wins.
pub const DATE_TEMPLATES: &[DateTemplate] = &[
    DateTemplate::new("%d/%m/%Y %I:%M %p", 4),
    DateTemplate::new("%d/%m/%Y %H:%M", 4),
    DateTemplate::new("%d/%m/%y %I:%M %p", 2),
    DateTemplate::new("%d/%m/%y %H:%M", 2),
    DateTemplate::new("%m/%d/%Y %I:%M %p", 4),
    DateTemplate::new("%m/%d/%Y %H:%M", 4),
    DateTemplate::new("%d/%m/%Y %H:%M:%S", 4),
    DateTemplate::new("%d/%m/%y %H:%M:%S", 2),
];

/// Lowercase substrings marking membership, encryption, deletion and call notices.
pub const SYSTEM_MARKERS: &[&str] = &[
    "end-to-end",
    "added",
    "removed",
    "left",
    "joined",
    "created group",
    "security code",
    "<media omitted>",
    "deleted this message",
    "null",
    "missed voice call",
    "missed video call",
    "you deleted",
];

/// Resolve a header's date and time tokens against [`DATE_TEMPLATES`].
pub fn resolve_timestamp(date: &str, time: &str) -> Option<NaiveDateTime> {
    let combined = format!("{} {}", date, time);
    let combined = combined.trim();
    let year_digits = date.rsplit('/').next().map_or(0, str::len);

    DATE_TEMPLATES
        .iter()
        .filter(|template| template.year_digits == year_digits)
        .find_map(|template| NaiveDateTime::parse_from_str(combined, template.format).ok())
}

/// Whether a message body contains any system marker (case-insensitive).
pub fn is_system_message(content: &str) -> bool {
    let lowered = content.to_lowercase();
    SYSTEM_MARKERS.iter().any(|marker| lowered.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn rules_are_tried_bracketed_first() {
        let names: Vec<&str> = HEADER_RULES.iter().map(HeaderRule::name).collect();
        assert_eq!(names, vec!["bracketed", "dash-separated"]);
    }

    #[test]
    fn bracketed_rule_captures_all_fields() {
        let fields = HEADER_RULES[0]
            .captures("[01/01/24, 10:00:00] Alice: hi there")
            .expect("bracketed header");
        assert_eq!(fields.date, "01/01/24");
        assert_eq!(fields.time, "10:00:00");
        assert_eq!(fields.sender, "Alice");
        assert_eq!(fields.content, "hi there");
    }

    #[test]
    fn dash_rule_accepts_en_dash_and_meridiem() {
        let fields = HEADER_RULES[1]
            .captures("12/31/2023, 9:15 PM – Bob: late night")
            .expect("dash header");
        assert_eq!(fields.time, "9:15 PM");
        assert_eq!(fields.sender.trim(), "Bob");
    }

    #[test]
    fn two_digit_year_uses_short_year_templates() {
        let ts = resolve_timestamp("01/01/24", "10:00:00").expect("timestamp");
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.hour(), 10);
    }

    #[test]
    fn day_first_wins_over_month_first_when_both_parse() {
        let ts = resolve_timestamp("03/04/2024", "10:00").expect("timestamp");
        assert_eq!(ts.day(), 3);
        assert_eq!(ts.month(), 4);
    }

    #[test]
    fn month_first_applies_when_day_first_is_impossible() {
        let ts = resolve_timestamp("12/31/2023", "9:15 PM").expect("timestamp");
        assert_eq!(ts.month(), 12);
        assert_eq!(ts.day(), 31);
        assert_eq!(ts.hour(), 21);
    }

    #[test]
    fn unparseable_timestamp_resolves_to_none() {
        assert!(resolve_timestamp("31/31/2023", "10:00").is_none());
        assert!(resolve_timestamp("01/01/024", "10:00").is_none());
        assert!(resolve_timestamp("01/01/2024", "10:00:00 PM").is_none());
    }

    #[test]
    fn system_markers_match_case_insensitively() {
        assert!(is_system_message("Alice JOINED using this group's invite link"));
        assert!(is_system_message("<Media omitted>"));
        assert!(!is_system_message("see you tomorrow"));
    }
}
