//! Schema adapters: one per vendor export layout.
//!
//! Each adapter recognises its layout structurally and converts raw
//! conversation objects into canonical [`Conversation`]s. Per-record
//! problems are absorbed here and tallied in [`ParseStats`]; nothing past
//! this module knows which vendor produced the data.

pub mod chatgpt;
pub mod claude;

use chrono::{DateTime, Utc};
use recap_core::error::{RecapError, Result};
use recap_core::models::{Conversation, ExportFormat, Message, Role};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::reader::ExportDocument;

pub use chatgpt::ChatGptAdapter;
pub use claude::ClaudeAdapter;

/// Title given to conversations that carry none.
pub const UNTITLED: &str = "Untitled";

// ── ParseStats ────────────────────────────────────────────────────────────────

/// Counters for records an adapter could not or chose not to emit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Conversation objects that failed to decode.
    pub skipped_conversations: usize,
    /// Message records that failed to decode.
    pub skipped_messages: usize,
    /// Messages with no text after flattening (hidden or attachment-only).
    pub empty_messages: usize,
    /// Emitted messages whose vendor role mapped to [`Role::Unknown`].
    pub unknown_roles: usize,
}

impl ParseStats {
    /// Total malformed records, conversations and messages together.
    pub fn skipped_count(&self) -> usize {
        self.skipped_conversations + self.skipped_messages
    }
}

// ── ParsedExport ──────────────────────────────────────────────────────────────

/// Canonical conversations plus parse bookkeeping for one export.
#[derive(Debug, Clone)]
pub struct ParsedExport {
    pub format: ExportFormat,
    pub conversations: Vec<Conversation>,
    pub stats: ParseStats,
}

impl ParsedExport {
    pub fn message_count(&self) -> usize {
        self.conversations.iter().map(|c| c.messages.len()).sum()
    }
}

// ── ExportAdapter ─────────────────────────────────────────────────────────────

/// Converts one vendor layout into the canonical record model.
pub trait ExportAdapter {
    /// The layout this adapter handles.
    fn format(&self) -> ExportFormat;

    /// Whether a single conversation object carries this layout's fingerprint.
    fn matches_conversation(&self, conversation: &Value) -> bool;

    /// Convert one raw conversation object.
    ///
    /// `position` is the conversation's index across the whole export and
    /// seeds fallback ids. Malformed messages are counted in `stats`; an
    /// `Err` means the conversation as a whole is unusable.
    fn parse_conversation(
        &self,
        raw: &Value,
        position: usize,
        stats: &mut ParseStats,
    ) -> Result<Conversation>;

    /// Whether a whole document is a conversation list in this layout.
    fn matches_document(&self, document: &Value) -> bool {
        document
            .as_array()
            .is_some_and(|items| items.iter().any(|item| self.matches_conversation(item)))
    }

    /// Parse every matching document, in order.
    fn parse(&self, documents: &[ExportDocument]) -> Result<ParsedExport> {
        let mut stats = ParseStats::default();
        let mut conversations = Vec::new();
        let mut position = 0usize;

        for doc in documents.iter().filter(|d| self.matches_document(&d.value)) {
            let Some(items) = doc.value.as_array() else {
                continue;
            };
            debug!("{}: {} conversation records in {}", self.format(), items.len(), doc.name);
            for item in items {
                match self.parse_conversation(item, position, &mut stats) {
                    Ok(conversation) => conversations.push(conversation),
                    Err(e) => {
                        debug!("Skipping conversation #{} in {}: {}", position, doc.name, e);
                        stats.skipped_conversations += 1;
                    }
                }
                position += 1;
            }
        }

        if conversations.is_empty() {
            return Err(RecapError::EmptyExport {
                format: self.format(),
            });
        }

        let parsed = ParsedExport {
            format: self.format(),
            conversations,
            stats,
        };
        info!(
            "Parsed {} conversations / {} messages ({} format, {} skipped records)",
            parsed.conversations.len(),
            parsed.message_count(),
            parsed.format,
            stats.skipped_count()
        );
        Ok(parsed)
    }
}

/// Every supported adapter, in detection priority order.
pub fn all_adapters() -> [&'static dyn ExportAdapter; 2] {
    [&ChatGptAdapter, &ClaudeAdapter]
}

/// The adapter for a detected format.
pub fn adapter_for(format: ExportFormat) -> &'static dyn ExportAdapter {
    match format {
        ExportFormat::ChatGpt => &ChatGptAdapter,
        ExportFormat::Claude => &ClaudeAdapter,
    }
}

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Decode a raw JSON value into an adapter's typed record.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(raw: &Value, context: &str) -> Result<T> {
    T::deserialize(raw).map_err(|e| RecapError::malformed(context, e))
}

/// Deserialize an optional field, reading an explicit `null` as the default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + serde::Deserialize<'de>,
{
    Ok(<Option<T> as serde::Deserialize>::deserialize(deserializer)?.unwrap_or_default())
}

/// A non-blank trimmed string, or `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Resolve a vendor role, counting anything unrecognised.
pub(crate) fn resolve_role(raw: Option<&str>, stats: &mut ParseStats) -> Role {
    let role = raw.map(Role::from_source).unwrap_or(Role::Unknown);
    if role == Role::Unknown {
        warn!("Unrecognised message role {:?}, counting as unknown", raw);
        stats.unknown_roles += 1;
    }
    role
}

/// Stable chronological sort by each message's own timestamp.
///
/// A message without one sorts as if stamped with the nearest earlier timed
/// message, so it stays where the vendor placed it among its neighbours.
/// Leading untimed messages use `fallback` (the conversation time), or the
/// first timed message when there is none.
pub(crate) fn order_chronologically(
    messages: &mut Vec<Message>,
    fallback: Option<DateTime<Utc>>,
) {
    let first_timed = messages.iter().find_map(|m| m.timestamp);
    let mut carried = fallback.or(first_timed);
    let mut keyed: Vec<(Option<DateTime<Utc>>, Message)> = messages
        .drain(..)
        .map(|message| {
            if message.timestamp.is_some() {
                carried = message.timestamp;
            }
            (carried, message)
        })
        .collect();
    keyed.sort_by_key(|(key, _)| *key);
    messages.extend(keyed.into_iter().map(|(_, message)| message));
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone as _;
    use serde_json::json;

    fn message(id: &str, ts: Option<DateTime<Utc>>) -> Message {
        Message::new(id, "c", Role::User, None, ts, "some text")
    }

    // ── order_chronologically ─────────────────────────────────────────────────

    #[test]
    fn test_order_chronologically_keeps_structural_order_on_ties() {
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let mut messages = vec![
            message("late", Some(t1)),
            message("tie-a", Some(t0)),
            message("tie-b", Some(t0)),
        ];
        order_chronologically(&mut messages, None);
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["tie-a", "tie-b", "late"]);
    }

    #[test]
    fn test_order_chronologically_untimed_keep_structural_place() {
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 5, 0).unwrap();
        let created = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
        let mut messages = vec![message("q1", Some(t1)), message("a", None), message("q2", Some(t2))];
        order_chronologically(&mut messages, Some(created));
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "a", "q2"]);
    }

    #[test]
    fn test_order_chronologically_leading_untimed_without_fallback() {
        let t0 = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2025, 1, 1, 10, 0, 0).unwrap();
        let mut messages = vec![
            message("x", None),
            message("late", Some(t1)),
            message("z", None),
            message("early", Some(t0)),
        ];
        order_chronologically(&mut messages, None);
        let ids: Vec<&str> = messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["early", "x", "late", "z"]);
    }

    // ── resolve_role ──────────────────────────────────────────────────────────

    #[test]
    fn test_resolve_role_counts_unknown() {
        let mut stats = ParseStats::default();
        assert_eq!(resolve_role(Some("human"), &mut stats), Role::User);
        assert_eq!(resolve_role(Some("narrator"), &mut stats), Role::Unknown);
        assert_eq!(resolve_role(None, &mut stats), Role::Unknown);
        assert_eq!(stats.unknown_roles, 2);
    }

    // ── adapter registry ──────────────────────────────────────────────────────

    #[test]
    fn test_adapter_for_round_trips_format() {
        for adapter in all_adapters() {
            assert_eq!(adapter_for(adapter.format()).format(), adapter.format());
        }
    }

    #[test]
    fn test_parse_with_no_matching_document_is_empty_export() {
        let docs = vec![ExportDocument::new("user.json", json!({"id": "u"}))];
        let err = ChatGptAdapter.parse(&docs).unwrap_err();
        assert!(matches!(
            err,
            RecapError::EmptyExport {
                format: ExportFormat::ChatGpt
            }
        ));
    }

    #[test]
    fn test_skipped_count_sums_conversations_and_messages() {
        let stats = ParseStats {
            skipped_conversations: 2,
            skipped_messages: 3,
            empty_messages: 7,
            unknown_roles: 1,
        };
        assert_eq!(stats.skipped_count(), 5);
    }
}
