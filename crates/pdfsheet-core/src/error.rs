use std::path::PathBuf;

use crate::annotate::Xref;

#[derive(Debug, thiserror::Error)]
pub enum PdfsheetError {
    #[error("no extractable content: the PDF has no tables and no text")]
    NoExtractableContent,

    #[error("no tables to write")]
    NoTables,

    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("workbook archive error: {0}")]
    Xlsx(#[from] zip::result::ZipError),

    #[error("workbook XML error: {0}")]
    Xml(String),

    #[error("page {page} is out of range (document has {count} page(s))")]
    PageOutOfRange { page: u32, count: u32 },

    #[error("annotation {0} not found on the current page")]
    AnnotationNotFound(Xref),

    #[error("malformed annotation {xref}: {reason}")]
    MalformedAnnotation { xref: Xref, reason: String },

    #[error("no document is open")]
    NoDocument,

    #[error("no annotation is selected")]
    NoSelection,

    #[error("batch worker thread panicked")]
    WorkerPanicked,

    #[error("failed to load settings from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid settings: {0}")]
    ConfigInvalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PdfsheetError {
    /// True for errors that mean the document simply had nothing to convert.
    pub fn is_content_error(&self) -> bool {
        matches!(
            self,
            PdfsheetError::NoExtractableContent | PdfsheetError::NoTables
        )
    }
}
