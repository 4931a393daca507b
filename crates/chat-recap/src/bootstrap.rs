use std::path::{Path, PathBuf};

use anyhow::Context as _;
use recap_data::summary::AggregationSummary;
use recap_render::Theme;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const SUMMARY_FILE: &str = "summary.json";
pub const REPORT_FILE: &str = "report.html";
pub const SHARE_CARD_FILE: &str = "share.svg";

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Map a configured level name onto an [`EnvFilter`] directive.
///
/// Unrecognised names pass through unchanged so that full filter syntax
/// (`recap_data=debug`) also works.
fn filter_directive(log_level: &str) -> String {
    match log_level.to_uppercase().as_str() {
        "DEBUG" => "debug".to_string(),
        "INFO" => "info".to_string(),
        "WARNING" | "WARN" => "warn".to_string(),
        "ERROR" => "error".to_string(),
        _ => log_level.to_string(),
    }
}

/// Initialise the global `tracing` subscriber, writing to stderr.
///
/// Falls back to `"info"` if the level string is not a valid filter.
pub fn setup_logging(log_level: &str) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(filter_directive(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    Ok(())
}

// ── Output writing ─────────────────────────────────────────────────────────────

/// Ensure the output directory exists (including any missing parents).
pub fn ensure_output_dir(out: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("creating output directory {}", out.display()))
}

/// Render every artifact into `out`, returning the written paths in order.
pub fn write_outputs(summary: &AggregationSummary, out: &Path) -> anyhow::Result<Vec<PathBuf>> {
    ensure_output_dir(out)?;
    let theme = Theme::dark();

    let artifacts = [
        (SUMMARY_FILE, recap_render::to_json(summary)?),
        (REPORT_FILE, recap_render::render_report(summary, &theme)?),
        (SHARE_CARD_FILE, recap_render::render_share_card(summary, &theme)),
    ];

    let mut written = Vec::with_capacity(artifacts.len());
    for (name, content) in artifacts {
        let path = out.join(name);
        std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use recap_core::config::RunConfig;
    use recap_data::reader::ExportDocument;
    use serde_json::json;
    use tempfile::TempDir;

    fn summary() -> AggregationSummary {
        let export = json!([{
            "uuid": "k1",
            "name": "Weekend plans",
            "chat_messages": [
                {"sender": "human", "text": "Any hiking ideas?", "created_at": "2025-05-03T09:00:00Z"},
                {"sender": "assistant", "text": "Try the ridge trail.", "created_at": "2025-05-03T09:00:10Z"}
            ]
        }]);
        let docs = vec![ExportDocument::new("conversations.json", export)];
        recap_data::analyze_export(&docs, &RunConfig::default()).expect("valid export")
    }

    #[test]
    fn test_filter_directive_maps_level_names() {
        assert_eq!(filter_directive("DEBUG"), "debug");
        assert_eq!(filter_directive("warning"), "warn");
        assert_eq!(filter_directive("recap_data=trace"), "recap_data=trace");
    }

    #[test]
    fn test_ensure_output_dir_creates_parents() {
        let tmp = TempDir::new().expect("tempdir");
        let out = tmp.path().join("a").join("b");
        ensure_output_dir(&out).expect("create");
        assert!(out.is_dir());
    }

    #[test]
    fn test_write_outputs_creates_all_files() {
        let tmp = TempDir::new().expect("tempdir");
        let out = tmp.path().join("out");
        let written = write_outputs(&summary(), &out).expect("write outputs");

        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![SUMMARY_FILE, REPORT_FILE, SHARE_CARD_FILE]);
        for path in &written {
            assert!(path.is_file(), "{} must exist", path.display());
        }

        let text = std::fs::read_to_string(out.join(SUMMARY_FILE)).unwrap();
        let back = recap_render::from_json(&text).unwrap();
        assert_eq!(back, summary());
    }
}
