use pdfsheet_core::batch::BatchEvent;
use pdfsheet_core::error::PdfsheetError;
use serde::Serialize;

pub fn print<T: Serialize + ?Sized>(value: &T) -> Result<(), PdfsheetError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}

/// One JSON object per line, so progress can be streamed.
pub fn print_event(event: &BatchEvent) -> Result<(), PdfsheetError> {
    let json = serde_json::to_string(event)?;
    println!("{json}");
    Ok(())
}
