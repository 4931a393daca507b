use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RecapError;

/// The vendor layout an export was produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Conversation list whose messages live in a `mapping` node tree.
    #[serde(rename = "chatgpt")]
    ChatGpt,
    /// Conversation list with a flat `chat_messages` array.
    Claude,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ChatGpt => "chatgpt",
            Self::Claude => "claude",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    Unknown,
}

impl Role {
    /// Every role, in display order.
    pub const ALL: [Role; 5] = [
        Role::User,
        Role::Assistant,
        Role::System,
        Role::Tool,
        Role::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::System => "system",
            Self::Tool => "tool",
            Self::Unknown => "unknown",
        }
    }

    /// Map a vendor role / sender string onto the canonical enum.
    ///
    /// Unrecognised strings resolve to [`Role::Unknown`].
    pub fn from_source(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "user" | "human" => Self::User,
            "assistant" | "ai" | "model" => Self::Assistant,
            "system" => Self::System,
            "tool" | "function" => Self::Tool,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RecapError;

    /// Strict parse of a canonical role name, as used in configuration.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == lower)
            .ok_or_else(|| RecapError::InvalidConfiguration(format!("unknown role \"{}\"", s)))
    }
}

/// A single message in canonical, format-agnostic form.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    /// Id of the owning [`Conversation`].
    pub conversation_id: String,
    pub role: Role,
    /// Model / author identifier when the source format supplies one.
    pub model: Option<String>,
    /// Per-message instant; `None` when the source omits it.
    pub timestamp: Option<DateTime<Utc>>,
    /// Flattened plain text.
    pub text: String,
    /// Unicode scalar values in the original text.
    pub content_length: usize,
    /// Word tokens in the original text.
    pub word_count: usize,
    /// Lowercased word tokens from the original text, with stopwords and
    /// digit-only tokens removed. Feeds the top words and bigrams.
    pub terms: Vec<String>,
}

impl Message {
    /// Build a message, measuring `text` once so later content transforms
    /// cannot change the recorded length, word count or terms.
    pub fn new(
        id: impl Into<String>,
        conversation_id: impl Into<String>,
        role: Role,
        model: Option<String>,
        timestamp: Option<DateTime<Utc>>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            id: id.into(),
            conversation_id: conversation_id.into(),
            role,
            model,
            timestamp,
            content_length: text.chars().count(),
            word_count: count_words(&text),
            terms: key_terms(&text),
            text,
        }
    }
}

/// A conversation and its linear, chronologically ordered messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub messages: Vec<Message>,
}

impl Conversation {
    /// The conversation-level instant used when a message has none.
    pub fn fallback_time(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.updated_at)
    }

    /// Resolve the instant of `message`, falling back to the conversation.
    pub fn message_time(&self, message: &Message) -> Option<DateTime<Utc>> {
        message.timestamp.or_else(|| self.fallback_time())
    }

    /// A copy of this conversation carrying only `messages`.
    pub fn with_messages(&self, messages: Vec<Message>) -> Self {
        Self {
            id: self.id.clone(),
            title: self.title.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            messages,
        }
    }
}

fn word_regex() -> &'static Regex {
    static WORD: OnceLock<Regex> = OnceLock::new();
    WORD.get_or_init(|| Regex::new(r"[A-Za-z0-9][A-Za-z0-9'_-]+").expect("regex is valid"))
}

/// Count word tokens: an ASCII alphanumeric followed by at least one
/// alphanumeric, apostrophe, underscore or hyphen.
pub fn count_words(text: &str) -> usize {
    word_regex().find_iter(text).count()
}

/// Common English words left out of the term rankings.
pub const STOPWORDS: [&str; 49] = [
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "can", "do", "for", "from", "have",
    "how", "i", "if", "in", "is", "it", "just", "like", "me", "my", "not", "of", "on", "or",
    "please", "so", "that", "the", "their", "them", "then", "there", "these", "they", "this", "to",
    "we", "what", "when", "where", "which", "with", "would", "you", "your",
];

/// Lowercased word tokens of `text` minus [`STOPWORDS`] and pure numbers.
pub fn key_terms(text: &str) -> Vec<String> {
    word_regex()
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .collect()
}
