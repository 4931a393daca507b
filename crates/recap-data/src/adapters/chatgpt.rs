//! ChatGPT export adapter.
//!
//! Conversations store messages as a tree in a `mapping` object: every node
//! names its parent and children, and regenerated replies create branches.
//! Nodes are loaded into an arena indexed by id and linearised with an
//! explicit-stack pre-order walk, so no recursive ownership is needed.

use std::collections::HashMap;

use recap_core::error::{RecapError, Result};
use recap_core::models::{Conversation, ExportFormat, Message};
use recap_core::time_utils::TimestampProcessor;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::{decode, non_blank, order_chronologically, resolve_role, ExportAdapter, ParseStats, UNTITLED};

/// Metadata keys that may carry the model identifier, in priority order.
const MODEL_KEYS: [&str; 3] = ["model_slug", "model", "model_name"];

// ── Raw records ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawConversation {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    conversation_id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    create_time: Option<f64>,
    #[serde(default)]
    update_time: Option<f64>,
    mapping: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    #[serde(default)]
    parent: Option<String>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    children: Vec<String>,
    #[serde(default)]
    message: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    author: Option<RawAuthor>,
    #[serde(default)]
    create_time: Option<f64>,
    #[serde(default)]
    content: Option<Value>,
    #[serde(default)]
    metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawAuthor {
    #[serde(default)]
    role: Option<String>,
}

// ── Node arena ────────────────────────────────────────────────────────────────

struct Node {
    id: String,
    parent: Option<String>,
    children: Vec<String>,
    message: Option<Value>,
}

/// Flat node table with parent/child links resolved through an id index.
struct NodeArena {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
}

impl NodeArena {
    fn build(mapping: &Map<String, Value>, conversation_id: &str, stats: &mut ParseStats) -> Self {
        let mut nodes = Vec::with_capacity(mapping.len());
        for (key, raw) in mapping {
            match decode::<RawNode>(raw, &format!("node {} of {}", key, conversation_id)) {
                Ok(node) => nodes.push(Node {
                    id: key.clone(),
                    parent: node.parent,
                    children: node.children,
                    message: node.message.filter(|m| !m.is_null()),
                }),
                Err(e) => {
                    debug!("{}", e);
                    stats.skipped_messages += 1;
                }
            }
        }
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id.clone(), i))
            .collect();
        Self { nodes, index }
    }

    /// Node indices in pre-order, roots first in table order.
    ///
    /// A root is a node whose parent is absent or not in the table. Nodes
    /// unreachable from any root (cycles) are appended in table order.
    fn traversal_order(&self) -> Vec<usize> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::with_capacity(self.nodes.len());

        let roots: Vec<usize> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                node.parent
                    .as_ref()
                    .map_or(true, |p| !self.index.contains_key(p))
            })
            .map(|(i, _)| i)
            .collect();

        let mut stack: Vec<usize> = Vec::new();
        let starts = roots.into_iter().chain(0..self.nodes.len());
        for start in starts {
            if visited[start] {
                continue;
            }
            stack.push(start);
            while let Some(i) = stack.pop() {
                if visited[i] {
                    continue;
                }
                visited[i] = true;
                order.push(i);
                for child in self.nodes[i].children.iter().rev() {
                    if let Some(&c) = self.index.get(child) {
                        if !visited[c] {
                            stack.push(c);
                        }
                    }
                }
            }
        }
        order
    }
}

// ── Content flattening ────────────────────────────────────────────────────────

/// Flatten a ChatGPT `content` object into plain text.
///
/// `text` and `multimodal_text` contribute their string parts and the
/// `text` of object parts; other content types contribute a top-level
/// `text` string if present. Images and other binary parts contribute
/// nothing.
fn flatten_content(content: &Value) -> String {
    let Some(obj) = content.as_object() else {
        return String::new();
    };
    let content_type = obj.get("content_type").and_then(Value::as_str);

    let text = match content_type {
        Some("text") | Some("multimodal_text") => {
            let parts = obj.get("parts").and_then(Value::as_array);
            parts
                .map(|parts| {
                    parts
                        .iter()
                        .filter_map(|part| match part {
                            Value::String(s) => Some(s.as_str()),
                            Value::Object(o) => o.get("text").and_then(Value::as_str),
                            _ => None,
                        })
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n")
                })
                .unwrap_or_default()
        }
        _ => obj
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    };
    text.trim().to_string()
}

fn extract_model(metadata: Option<&Map<String, Value>>) -> Option<String> {
    let metadata = metadata?;
    MODEL_KEYS
        .iter()
        .find_map(|key| non_blank(metadata.get(*key).and_then(Value::as_str)))
}

// ── Adapter ───────────────────────────────────────────────────────────────────

/// Adapter for exports whose conversations carry a `mapping` node tree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatGptAdapter;

impl ChatGptAdapter {
    fn parse_message(
        raw: &Value,
        position: usize,
        conversation_id: &str,
        stats: &mut ParseStats,
    ) -> Option<Message> {
        let context = format!("message #{} of {}", position, conversation_id);
        let record: RawMessage = match decode(raw, &context) {
            Ok(r) => r,
            Err(e) => {
                debug!("{}", e);
                stats.skipped_messages += 1;
                return None;
            }
        };

        let text = record
            .content
            .as_ref()
            .map(flatten_content)
            .unwrap_or_default();
        if text.is_empty() {
            stats.empty_messages += 1;
            return None;
        }

        let role = resolve_role(
            record.author.as_ref().and_then(|a| a.role.as_deref()),
            stats,
        );
        let id = non_blank(record.id.as_deref())
            .unwrap_or_else(|| format!("{}:{}", conversation_id, position));

        Some(Message::new(
            id,
            conversation_id,
            role,
            extract_model(record.metadata.as_ref()),
            record.create_time.and_then(TimestampProcessor::from_unix_seconds),
            text,
        ))
    }
}

impl ExportAdapter for ChatGptAdapter {
    fn format(&self) -> ExportFormat {
        ExportFormat::ChatGpt
    }

    fn matches_conversation(&self, conversation: &Value) -> bool {
        conversation
            .get("mapping")
            .is_some_and(Value::is_object)
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

        let id = non_blank(record.id.as_deref())
            .or_else(|| non_blank(record.conversation_id.as_deref()))
            .unwrap_or_else(|| format!("conversation-{}", position));

        let arena = NodeArena::build(&record.mapping, &id, stats);
        let mut messages: Vec<Message> = Vec::new();
        for (step, i) in arena.traversal_order().into_iter().enumerate() {
            if let Some(raw_message) = &arena.nodes[i].message {
                if let Some(message) = Self::parse_message(raw_message, step, &id, stats) {
                    messages.push(message);
                }
            }
        }

        let created_at = record.create_time.and_then(TimestampProcessor::from_unix_seconds);
        let updated_at = record.update_time.and_then(TimestampProcessor::from_unix_seconds);
        order_chronologically(&mut messages, created_at.or(updated_at));

        Ok(Conversation {
            id,
            title: non_blank(record.title.as_deref()).unwrap_or_else(|| UNTITLED.to_string()),
            created_at,
            updated_at,
            messages,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
