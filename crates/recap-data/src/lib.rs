//! Export parsing and statistics engine for chat recap.
//!
//! Responsible for loading an extracted export directory, detecting its
//! vendor layout, normalising conversations into the canonical model,
//! optional redaction, year/role filtering, aggregation, and assembling the
//! serialisable summary.

pub mod adapters;
pub mod aggregator;
pub mod analysis;
pub mod detector;
pub mod filter;
pub mod reader;
pub mod redactor;
pub mod summary;

pub use analysis::{analyze_directory, analyze_export};
pub use summary::{AggregationSummary, SummaryMetadata};
