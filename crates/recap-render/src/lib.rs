//! Renderers for a finished recap.
//!
//! Each renderer consumes an [`AggregationSummary`](recap_data::summary::AggregationSummary)
//! and returns the document as a string; writing files is left to the caller.

pub mod json;
pub mod report;
pub mod share_card;
pub mod text;
pub mod theme;

pub use json::{from_json, to_json};
pub use report::render_report;
pub use share_card::render_share_card;
pub use theme::Theme;

#[cfg(test)]
pub(crate) mod test_support;
