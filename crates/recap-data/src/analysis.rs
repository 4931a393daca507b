//! Main recap pipeline.
//!
//! Runs detect → parse → redact → filter → aggregate → assemble over an
//! export already resident in memory, returning an [`AggregationSummary`]
//! ready for the renderers.

use std::path::Path;

use recap_core::config::RunConfig;
use recap_core::error::Result;
use recap_core::time_utils::LocalCalendar;
use tracing::info;

use crate::adapters::adapter_for;
use crate::aggregator::StatsAggregator;
use crate::detector::detect_format;
use crate::filter::filter_records;
use crate::reader::{load_export_documents, ExportDocument};
use crate::redactor::Redactor;
use crate::summary::{assemble, AggregationSummary};

/// Run the full pipeline over parsed export documents.
///
/// 1. Detect the format structurally.
/// 2. Convert matching documents to canonical conversations.
/// 3. Scrub text when `config.redact` is set.
/// 4. Apply the role scope and year window.
/// 5. Aggregate and attach run metadata.
///
/// Fails with `UnrecognizedFormat` or `EmptyExport` before any statistics
/// are computed; per-record problems only show up as metadata counters.
pub fn analyze_export(documents: &[ExportDocument], config: &RunConfig) -> Result<AggregationSummary> {
    // ── Step 1: Detect ────────────────────────────────────────────────────────
    let format = detect_format(documents)?;

    // ── Step 2: Parse ─────────────────────────────────────────────────────────
    let mut parsed = adapter_for(format).parse(documents)?;

    // ── Step 3: Redact ────────────────────────────────────────────────────────
    if config.redact {
        parsed.conversations = Redactor::new().redact(&parsed.conversations);
    }

    // ── Step 4: Filter ────────────────────────────────────────────────────────
    let calendar = LocalCalendar::new(config.timezone);
    let filtered = filter_records(
        &parsed.conversations,
        config.year,
        &config.role_scope,
        &calendar,
    );

    // ── Step 5: Aggregate ─────────────────────────────────────────────────────
    let aggregation = StatsAggregator::from_config(config).aggregate(&filtered.conversations);
    let summary = assemble(&parsed, &filtered, aggregation, config);

    info!(
        "Recap ready: {} messages in {} conversations ({} format, year {})",
        summary.totals.message_count,
        summary.totals.conversation_count,
        format,
        config
            .year
            .map_or_else(|| "all".to_string(), |y| y.to_string())
    );
    Ok(summary)
}

/// Load every JSON file under `root` and run [`analyze_export`].
pub fn analyze_directory(root: &Path, config: &RunConfig) -> Result<AggregationSummary> {
    let documents = load_export_documents(root)?;
    analyze_export(&documents, config)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
