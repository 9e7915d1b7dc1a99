pub mod lopdf_text;
pub mod pdftotext;
pub mod table;

use crate::error::PdfsheetError;
use crate::model::RawTable;

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// 1-based page number.
    pub page_number: u32,
    /// Tables detected on the page, in reading order.
    pub tables: Vec<RawTable>,
    /// Plain page text, `None` when the page has none.
    pub text: Option<String>,
}

impl PageContent {
    /// Build a page from layout-preserving text, detecting tables in it.
    pub fn from_layout_text(page_number: u32, text: &str) -> Self {
        let tables = table::detect_tables(page_number, text);
        let text = (!text.is_empty()).then(|| text.to_string());
        PageContent {
            page_number,
            tables,
            text,
        }
    }
}

/// Trait for PDF table/text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract tables and text from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, PdfsheetError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Pick the best available backend: pdftotext when installed, lopdf otherwise.
pub fn default_extractor() -> Box<dyn PdfExtractor> {
    if pdftotext::PdftotextExtractor::is_available() {
        Box::new(pdftotext::PdftotextExtractor::new())
    } else {
        tracing::debug!("pdftotext not available, using lopdf text extraction");
        Box::new(lopdf_text::LopdfExtractor::new())
    }
}
