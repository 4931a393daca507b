//! Scrubbing of personally identifying text.
//!
//! Only `text` and `title` fields change. Measured fields such as
//! `content_length` and `word_count` were fixed when the adapter built the
//! message, so every statistic is identical with or without redaction.

use recap_core::models::{Conversation, Message};
use regex::Regex;
use tracing::debug;

/// Pattern/replacement pairs, applied in order.
const RULES: [(&str, &str); 4] = [
    (
        r"(?i)\b[A-Z0-9._%+-]+@[A-Z0-9.-]+\.[A-Z]{2,}\b",
        "[redacted-email]",
    ),
    (r"(?i)\bhttps?://\S+", "[redacted-url]"),
    (
        r"\b(?:\+?\d{1,3}[-. ]?)?(?:\(?\d{2,3}\)?[-. ]?)?\d{3}[-. ]?\d{4}\b",
        "[redacted-phone]",
    ),
    (r"\d{6,}", "[redacted-number]"),
];

/// Regex-based text scrubber.
#[derive(Debug, Clone)]
pub struct Redactor {
    rules: Vec<(Regex, &'static str)>,
}

impl Default for Redactor {
    fn default() -> Self {
        Self::new()
    }
}

impl Redactor {
    pub fn new() -> Self {
        let rules = RULES
            .iter()
            .map(|(pattern, replacement)| {
                (Regex::new(pattern).expect("regex is valid"), *replacement)
            })
            .collect();
        Self { rules }
    }

    /// Replace every sensitive match in `text` with its placeholder.
    pub fn redact_text(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (re, replacement) in &self.rules {
            if re.is_match(&out) {
                out = re.replace_all(&out, *replacement).into_owned();
            }
        }
        out
    }

    /// A scrubbed copy of `conversations`; the input is left untouched.
    pub fn redact(&self, conversations: &[Conversation]) -> Vec<Conversation> {
        let redacted: Vec<Conversation> = conversations
            .iter()
            .map(|conv| {
                let messages = conv.messages.iter().map(|m| self.redact_message(m)).collect();
                Conversation {
                    title: self.redact_text(&conv.title),
                    ..conv.with_messages(messages)
                }
            })
            .collect();
        debug!("Redacted {} conversations", redacted.len());
        redacted
    }

    fn redact_message(&self, message: &Message) -> Message {
        Message {
            text: self.redact_text(&message.text),
            ..message.clone()
        }
    }
}
