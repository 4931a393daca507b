mod bootstrap;

use anyhow::Result;
use clap::Parser;
use recap_core::settings::Settings;
use recap_data::analysis::analyze_directory;

fn main() -> Result<()> {
    let settings = Settings::parse();

    bootstrap::setup_logging(settings.effective_log_level())?;
    tracing::info!("Chat Recap v{} starting", env!("CARGO_PKG_VERSION"));

    // Validate options before touching the export.
    let config = settings.run_config()?;
    tracing::debug!(
        "Export: {}, out: {}, year: {:?}, redact: {}, timezone: {}",
        settings.export.display(),
        settings.out.display(),
        config.year,
        config.redact,
        config.timezone.name()
    );

    let summary = analyze_directory(&settings.export, &config)?;
    if summary.metadata.skipped_count > 0 {
        tracing::warn!(
            "Skipped {} malformed records ({} conversations, {} messages)",
            summary.metadata.skipped_count,
            summary.metadata.skipped_conversations,
            summary.metadata.skipped_messages
        );
    }

    for path in bootstrap::write_outputs(&summary, &settings.out)? {
        println!("Wrote: {}", path.display());
    }
    Ok(())
}
