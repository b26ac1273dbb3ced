//! Timestamp redaction for page text.
//!
//! Chat exports and similar documents print a `DD/MM/YYYY, HH:MM` stamp at
//! the foot of each page. The first such stamp and everything after it is
//! dropped from the stored text.

use std::sync::OnceLock;

use regex::Regex;

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d{2}/\d{2}/\d{4}, \d{2}:\d{2}").expect("literal regex"))
}

/// Truncate `text` at the first date-time stamp, if any.
pub fn redact_timestamp(text: &str) -> &str {
    match timestamp_regex().find(text) {
        Some(m) => &text[..m.start()],
        None => text,
    }
}
