//! `summary.json` serialisation.

use recap_core::error::Result;
use recap_data::summary::AggregationSummary;

/// Pretty-printed summary document.
pub fn to_json(summary: &AggregationSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

/// Parse a document produced by [`to_json`].
pub fn from_json(text: &str) -> Result<AggregationSummary> {
    Ok(serde_json::from_str(text)?)
}

/// Compact JSON safe to place verbatim inside a `<script>` element.
///
/// Every `<` is written as `\u003c`, so no `</script>` can appear.
pub fn to_script_json(summary: &AggregationSummary) -> Result<String> {
    Ok(serde_json::to_string(summary)?.replace('<', "\\u003c"))
}
