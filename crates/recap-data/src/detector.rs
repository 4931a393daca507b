//! Structural format detection.

use recap_core::error::{RecapError, Result};
use recap_core::models::ExportFormat;
use tracing::debug;

use crate::adapters::all_adapters;
use crate::reader::ExportDocument;

/// Pick the export format from document shapes alone.
///
/// Documents are examined in order and, for each, the adapters in their
/// priority order; the first fingerprint match wins. File names play no
/// part in the verdict.
pub fn detect_format(documents: &[ExportDocument]) -> Result<ExportFormat> {
    for doc in documents {
        for adapter in all_adapters() {
            if adapter.matches_document(&doc.value) {
                debug!("Detected {} export from {}", adapter.format(), doc.name);
                return Ok(adapter.format());
            }
        }
    }
    Err(RecapError::UnrecognizedFormat)
}
