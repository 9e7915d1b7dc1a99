use serde::{Deserialize, Serialize};

/// A single extracted cell: text, or null when the extractor saw an empty slot.
pub type RawCell = Option<String>;

/// Unprocessed table as reported by page-level table detection.
///
/// Row 0 is the header candidate. Rows may be shorter than one another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// 1-based page number.
    pub page: u32,
    /// 1-based table index within the page.
    pub index: u32,
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    pub fn new(page: u32, index: u32, rows: Vec<Vec<RawCell>>) -> Self {
        Self { page, index, rows }
    }

    /// Build a table from plain string rows, mapping `""` to a null cell.
    pub fn from_text_rows(page: u32, index: u32, rows: &[Vec<&str>]) -> Self {
        let rows = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                    .collect()
            })
            .collect();
        Self { page, index, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Rectangular table: every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub page: u32,
    pub index: u32,
}

impl NormalizedTable {
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_rectangular(&self) -> bool {
        self.rows.iter().all(|row| row.len() == self.columns.len())
    }
}

/// Plain text of one page, used when a document has no tables at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    pub page: u32,
    pub content: String,
}

/// What a document yielded after table extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum ExtractedContent {
    /// Normalized tables in page, then table order.
    Tables(Vec<NormalizedTable>),
    /// No table survived; per-page text with at least one non-empty page.
    Text(Vec<PageText>),
}

impl ExtractedContent {
    pub fn table_count(&self) -> usize {
        match self {
            ExtractedContent::Tables(tables) => tables.len(),
            ExtractedContent::Text(_) => 0,
        }
    }

    pub fn row_count(&self) -> usize {
        match self {
            ExtractedContent::Tables(tables) => tables.iter().map(|t| t.rows.len()).sum(),
            ExtractedContent::Text(pages) => pages.len(),
        }
    }
}
