pub mod annotate;
pub mod batch;
pub mod config;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod model;
pub mod parsing;
pub mod workbook;

use error::PdfsheetError;
use extraction::PdfExtractor;
use layout::WorkbookPlan;

/// Main API entry point: turn PDF bytes into a workbook layout.
///
/// Tables found on every page are normalized and laid out either one sheet
/// per table or, with `merge`, stacked in a single sheet. A document
/// without tables falls back to its page text. Nothing is written here;
/// see [`workbook::write_plan`].
pub fn convert_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    merge: bool,
) -> Result<WorkbookPlan, PdfsheetError> {
    let pages = extractor.extract_pages(pdf_bytes)?;
    tracing::debug!(
        backend = extractor.backend_name(),
        pages = pages.len(),
        "pages extracted"
    );

    let content = parsing::parse_tables(&pages)?;
    layout::plan_workbook(content, merge)
}
