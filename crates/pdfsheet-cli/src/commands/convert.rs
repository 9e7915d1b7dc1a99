use anyhow::{bail, Context, Result};
use pdfsheet_core::batch::{spawn_batch, BatchEvent};
use pdfsheet_core::config::{load_settings, Settings};
use pdfsheet_core::extraction::default_extractor;
use std::path::PathBuf;

use crate::output;
use crate::OutputFormat;

pub fn run(
    files: Vec<PathBuf>,
    merge: bool,
    out_dir: Option<PathBuf>,
    config: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<()> {
    let settings = match config {
        Some(path) => load_settings(&path)?,
        None => Settings::default(),
    };

    let mut options = settings.convert_options();
    options.merge |= merge;
    if out_dir.is_some() {
        options.output_dir = out_dir;
    }
    if let Some(dir) = &options.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory '{}'", dir.display()))?;
    }

    let jobs: Vec<_> = files.into_iter().map(|f| options.job_for(f)).collect();
    tracing::info!(files = jobs.len(), merge = options.merge, "starting batch");
    let handle = spawn_batch(jobs, default_extractor(), options)?;

    for event in handle.events().iter() {
        match output_format {
            OutputFormat::Json => output::json::print_event(&event)?,
            OutputFormat::Table => output::table::print_event(&event),
        }
    }

    let report = handle.join()?;
    if !report.is_success() {
        bail!(
            "{} of {} file(s) could not be converted",
            report.failures.len(),
            report.total()
        );
    }
    Ok(())
}
