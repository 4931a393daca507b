//! Claude export adapter.
//!
//! Conversations carry a flat, already ordered `chat_messages` array with
//! RFC 3339 timestamps and `human` / `assistant` senders. The export has no
//! per-message model field.

use recap_core::error::{RecapError, Result};
use recap_core::models::{Conversation, ExportFormat, Message};
use recap_core::time_utils::TimestampProcessor;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::{decode, non_blank, order_chronologically, resolve_role, ExportAdapter, ParseStats, UNTITLED};

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    chat_messages: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    sender: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    content: Vec<RawContent>,
    #[serde(default)]
    created_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawContent {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl RawMessage {
    /// The `text` field, or the joined text blocks when it is blank.
    fn flattened_text(&self) -> String {
        let direct = self.text.as_deref().map(str::trim).unwrap_or_default();
        if !direct.is_empty() {
            return direct.to_string();
        }
        self.content
            .iter()
            .filter(|block| block.kind.as_deref().map_or(true, |k| k == "text"))
            .filter_map(|block| block.text.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_time(raw: Option<&str>) -> Option<chrono::DateTime<chrono::Utc>> {
    raw.and_then(TimestampProcessor::parse_str)
}

/// Adapter for exports whose conversations carry a `chat_messages` array.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaudeAdapter;

impl ExportAdapter for ClaudeAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Claude
    }

    fn matches_conversation(&self, conversation: &Value) -> bool {
        conversation
            .get("chat_messages")
            .is_some_and(Value::is_array)
    }

    fn parse_conversation(
        &self,
        raw: &Value,
        position: usize,
        stats: &mut ParseStats,
    ) -> Result<Conversation> {
        if !raw.is_object() {
            return Err(RecapError::malformed(
                format!("conversation #{}", position),
                "not a JSON object",
            ));
        }
        let record: RawConversation = decode(raw, &format!("conversation #{}", position))?;
        let id = non_blank(record.uuid.as_deref())
            .unwrap_or_else(|| format!("conversation-{}", position));

        let mut messages = Vec::with_capacity(record.chat_messages.len());
        for (n, raw_message) in record.chat_messages.iter().enumerate() {
            let context = format!("message #{} of {}", n, id);
            let message: RawMessage = match decode(raw_message, &context) {
                Ok(m) => m,
                Err(e) => {
                    debug!("{}", e);
                    stats.skipped_messages += 1;
                    continue;
                }
            };

            let text = message.flattened_text();
            if text.is_empty() {
                stats.empty_messages += 1;
                continue;
            }
            let role = resolve_role(message.sender.as_deref(), stats);
            let message_id =
                non_blank(message.uuid.as_deref()).unwrap_or_else(|| format!("{}:{}", id, n));

            messages.push(Message::new(
                message_id,
                id.as_str(),
                role,
                None,
                parse_time(message.created_at.as_deref()),
                text,
            ));
        }

        let created_at = parse_time(record.created_at.as_deref());
        let updated_at = parse_time(record.updated_at.as_deref());
        order_chronologically(&mut messages, created_at.or(updated_at));

        Ok(Conversation {
            id,
            title: non_blank(record.name.as_deref()).unwrap_or_else(|| UNTITLED.to_string()),
            created_at,
            updated_at,
            messages,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
