//! CSV export handlers shared by `run`, `leads` and `export`.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use leadgen_core::{AppConfig, LeadBatch};
use leadgen_pipeline::{export_file_name, write_csv, LeadSummary};

/// Resolve the CSV path: an explicit `--output`, or today's file name in the
/// configured export directory.
pub(crate) fn output_path(config: &AppConfig, output: Option<&Path>) -> PathBuf {
    output.map_or_else(
        || config.export_dir.join(export_file_name(Utc::now().date_naive())),
        Path::to_path_buf,
    )
}

/// Write `batch` to CSV and print a summary.
pub(crate) fn export_batch(
    config: &AppConfig,
    batch: &LeadBatch,
    output: Option<&Path>,
) -> anyhow::Result<PathBuf> {
    let path = output_path(config, output);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let rows = write_csv(&path, &batch.companies)?;

    print_summary(batch);
    println!("wrote {rows} rows to {}", path.display());
    Ok(path)
}

pub(crate) fn print_summary(batch: &LeadBatch) {
    let summary = LeadSummary::from_batch(batch);
    println!(
        "{} companies, {} contacts ({} enriched, {} pending)",
        summary.companies, summary.contacts, summary.enriched, summary.pending
    );
    for (channel, count) in &summary.by_channel {
        let channel = if channel.is_empty() { "(unknown)" } else { channel };
        println!("  {channel:<20} {count}");
    }
    if !batch.generation_summary.is_empty() {
        println!("{}", batch.generation_summary);
    }
}

/// Flatten a saved lead batch JSON file into CSV.
///
/// # Errors
///
/// Returns an error if the input cannot be read or decoded, or if the CSV
/// cannot be written.
pub(crate) fn run_export(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let mut batch: LeadBatch = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a lead batch", input.display()))?;
    batch.normalize();

    export_batch(config, &batch, output)?;
    Ok(())
}
