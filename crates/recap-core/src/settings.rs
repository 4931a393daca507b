use clap::Parser;
use std::path::PathBuf;

use crate::config::{RunConfig, DEFAULT_MAX_EXCERPTS, DEFAULT_TOP_N};
use crate::error::Result;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Year-in-review statistics for AI chat data exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "chat-recap",
    about = "Year-in-review statistics for AI chat data exports",
    version
)]
pub struct Settings {
    /// Extracted export directory (ChatGPT or Claude data export)
    #[arg(long)]
    pub export: PathBuf,

    /// Output directory
    #[arg(long, default_value = "out")]
    pub out: PathBuf,

    /// Restrict statistics to one calendar year (local time)
    #[arg(long)]
    pub year: Option<i32>,

    /// Comma-separated roles to include: user, assistant, system, tool (default: all)
    #[arg(long, value_delimiter = ',')]
    pub role_scope: Vec<String>,

    /// Redact emails, URLs, phone numbers and long digit runs from text
    #[arg(long)]
    pub redact: bool,

    /// Timezone used for days and hours (auto-detected if not specified)
    #[arg(long, default_value = "auto", env = "CHAT_RECAP_TIMEZONE")]
    pub timezone: String,

    /// Entries kept in each top list
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Maximum number of excerpts in the report
    #[arg(long, default_value_t = DEFAULT_MAX_EXCERPTS)]
    pub max_excerpts: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Validate the recap options into a [`RunConfig`].
    pub fn run_config(&self) -> Result<RunConfig> {
        Ok(RunConfig::from_options(
            self.year,
            &self.role_scope,
            self.redact,
            &self.timezone,
        )?
        .with_top_n(self.top_n)
        .with_max_excerpts(self.max_excerpts))
    }

    /// The log level after applying `--debug`.
    pub fn effective_log_level(&self) -> &str {
        if self.debug {
            "DEBUG"
        } else {
            &self.log_level
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
