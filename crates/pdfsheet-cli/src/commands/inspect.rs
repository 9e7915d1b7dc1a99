use anyhow::{Context, Result};
use pdfsheet_core::extraction::default_extractor;
use std::path::Path;

use crate::output;
use crate::OutputFormat;

pub fn run(input_file: &Path, merge: bool, output_format: OutputFormat) -> Result<()> {
    let pdf_bytes = std::fs::read(input_file)
        .with_context(|| format!("failed to read '{}'", input_file.display()))?;
    let extractor = default_extractor();
    let plan = pdfsheet_core::convert_pdf(&pdf_bytes, extractor.as_ref(), merge)
        .with_context(|| format!("failed to convert '{}'", input_file.display()))?;

    match output_format {
        OutputFormat::Json => output::json::print(&plan)?,
        OutputFormat::Table => print!("{}", output::table::format_plan(&plan)),
    }
    Ok(())
}
