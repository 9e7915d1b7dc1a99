pub mod xlsx;

use std::path::Path;

use crate::error::PdfsheetError;
use crate::layout::WorkbookPlan;
use xlsx::XlsxWriter;

/// Write every sheet of a plan to an `.xlsx` file at `path`.
///
/// Nothing is left at `path` when writing fails.
pub fn write_plan(plan: &WorkbookPlan, path: &Path) -> Result<(), PdfsheetError> {
    let mut writer = XlsxWriter::create(path)?;
    for sheet in plan.sheets() {
        writer.write_sheet(&sheet)?;
    }
    writer.close()
}
