//! The summary handed to renderers, and its assembly.

use chrono::{DateTime, Utc};
use recap_core::config::RunConfig;
use recap_core::models::{ExportFormat, Role};
use serde::{Deserialize, Serialize};

use crate::adapters::ParsedExport;
use crate::aggregator::{
    Aggregation, ConversationRank, CountEntry, Distribution, Excerpt, Peaks, Streaks, Totals,
    TrendPoint,
};
use crate::filter::FilterOutcome;

/// How the run was configured and what was left out along the way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMetadata {
    pub source_format: ExportFormat,
    /// Applied year window, if any.
    pub year: Option<i32>,
    /// Applied role scope; `None` means every role.
    pub role_scope: Option<Vec<Role>>,
    pub redacted: bool,
    /// IANA name of the zone used for local-time buckets.
    pub timezone: String,
    /// Conversations the adapter produced, before filtering.
    pub conversations_in_export: usize,
    /// Messages the adapter produced, before filtering.
    pub messages_in_export: usize,
    /// Malformed records: conversations plus messages.
    pub skipped_count: usize,
    pub skipped_conversations: usize,
    pub skipped_messages: usize,
    /// Messages with no text, not emitted by the adapter.
    pub empty_messages: usize,
    /// Emitted messages whose role could not be resolved.
    pub unknown_role_messages: usize,
    /// In-scope messages with no resolvable instant.
    pub untimed_messages: usize,
    /// Messages dropped by the year window for lack of an instant.
    pub excluded_untimed_messages: usize,
    /// In-scope messages placed in time by their conversation's timestamp.
    pub conversation_timed_messages: usize,
    /// Messages outside the role scope.
    pub out_of_scope_messages: usize,
    /// Timed messages whose local date falls outside the year window.
    pub out_of_year_messages: usize,
}

/// The complete year-in-review result for one export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSummary {
    pub metadata: SummaryMetadata,
    pub totals: Totals,
    pub distribution: Distribution,
    pub streaks: Streaks,
    pub peaks: Peaks,
    pub top_models: Vec<CountEntry>,
    pub top_conversations: Vec<ConversationRank>,
    /// Most frequent words, measured before any redaction.
    pub top_words: Vec<CountEntry>,
    pub top_bigrams: Vec<CountEntry>,
    pub trend: Vec<TrendPoint>,
    pub first_message: Option<DateTime<Utc>>,
    pub last_message: Option<DateTime<Utc>>,
    pub excerpts: Vec<Excerpt>,
    pub fun_facts: Vec<String>,
}

/// Bundle an aggregation with the run's bookkeeping.
pub fn assemble(
    parsed: &ParsedExport,
    filtered: &FilterOutcome,
    aggregation: Aggregation,
    config: &RunConfig,
) -> AggregationSummary {
    let metadata = SummaryMetadata {
        source_format: parsed.format,
        year: config.year,
        role_scope: config.role_scope.roles(),
        redacted: config.redact,
        timezone: config.timezone.name().to_string(),
        conversations_in_export: parsed.conversations.len(),
        messages_in_export: parsed.message_count(),
        skipped_count: parsed.stats.skipped_count(),
        skipped_conversations: parsed.stats.skipped_conversations,
        skipped_messages: parsed.stats.skipped_messages,
        empty_messages: parsed.stats.empty_messages,
        unknown_role_messages: parsed.stats.unknown_roles,
        untimed_messages: aggregation.untimed_messages,
        excluded_untimed_messages: filtered.excluded_untimed,
        conversation_timed_messages: aggregation.conversation_timed_messages,
        out_of_scope_messages: filtered.out_of_scope,
        out_of_year_messages: filtered.out_of_year,
    };

    AggregationSummary {
        metadata,
        totals: aggregation.totals,
        distribution: aggregation.distribution,
        streaks: aggregation.streaks,
        peaks: aggregation.peaks,
        top_models: aggregation.top_models,
        top_conversations: aggregation.top_conversations,
        top_words: aggregation.top_words,
        top_bigrams: aggregation.top_bigrams,
        trend: aggregation.trend,
        first_message: aggregation.first_message,
        last_message: aggregation.last_message,
        excerpts: aggregation.excerpts,
        fun_facts: aggregation.fun_facts,
    }
}
