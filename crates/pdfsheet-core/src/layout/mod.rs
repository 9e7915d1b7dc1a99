pub mod sheet_name;

use serde::Serialize;

use crate::error::PdfsheetError;
use crate::model::{ExtractedContent, NormalizedTable, PageText};
use sheet_name::{table_sheet_name, SheetNamer, MERGED_SHEET_NAME, TEXT_SHEET_NAME};

/// One cell as it lands in a worksheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SheetCell {
    Text(String),
    Number(f64),
}

impl SheetCell {
    pub fn is_blank(&self) -> bool {
        matches!(self, SheetCell::Text(s) if s.is_empty())
    }
}

impl From<&str> for SheetCell {
    fn from(s: &str) -> Self {
        SheetCell::Text(s.to_string())
    }
}

impl From<String> for SheetCell {
    fn from(s: String) -> Self {
        SheetCell::Text(s)
    }
}

/// A worksheet ready to be written: optional header row plus data rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetData {
    pub name: String,
    pub header: Option<Vec<String>>,
    pub rows: Vec<Vec<SheetCell>>,
}

/// How a document's tables are laid out in a workbook.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum WorkbookPlan {
    /// Every table stacked in one sheet: header row, data rows, blank row.
    /// All rows are padded to `width`.
    Merged {
        sheet_name: String,
        width: usize,
        blocks: Vec<Vec<Vec<String>>>,
    },
    /// One sheet per table, names unique within the workbook.
    Separate {
        sheets: Vec<(String, NormalizedTable)>,
    },
    /// Plain text per page, used when the document had no tables.
    TextContent { sheet_name: String, pages: Vec<PageText> },
}

impl WorkbookPlan {
    pub fn sheet_names(&self) -> Vec<&str> {
        match self {
            WorkbookPlan::Merged { sheet_name, .. } | WorkbookPlan::TextContent { sheet_name, .. } => {
                vec![sheet_name.as_str()]
            }
            WorkbookPlan::Separate { sheets } => sheets.iter().map(|(n, _)| n.as_str()).collect(),
        }
    }

    /// Number of source tables in the plan, 0 for the text fallback.
    pub fn table_count(&self) -> usize {
        match self {
            WorkbookPlan::Merged { blocks, .. } => blocks.len(),
            WorkbookPlan::Separate { sheets } => sheets.len(),
            WorkbookPlan::TextContent { .. } => 0,
        }
    }

    /// Data rows written, excluding header and separator rows.
    pub fn data_row_count(&self) -> usize {
        match self {
            WorkbookPlan::Merged { blocks, .. } => {
                blocks.iter().map(|b| b.len().saturating_sub(2)).sum()
            }
            WorkbookPlan::Separate { sheets } => sheets.iter().map(|(_, t)| t.rows.len()).sum(),
            WorkbookPlan::TextContent { pages, .. } => pages.len(),
        }
    }

    /// Flatten the plan into worksheets for the workbook writer.
    pub fn sheets(&self) -> Vec<SheetData> {
        match self {
            WorkbookPlan::Merged {
                sheet_name, blocks, ..
            } => vec![SheetData {
                name: sheet_name.clone(),
                header: None,
                rows: blocks
                    .iter()
                    .flatten()
                    .map(|row| row.iter().map(|c| SheetCell::from(c.as_str())).collect())
                    .collect(),
            }],
            WorkbookPlan::Separate { sheets } => sheets
                .iter()
                .map(|(name, table)| SheetData {
                    name: name.clone(),
                    header: Some(table.columns.clone()),
                    rows: table
                        .rows
                        .iter()
                        .map(|row| row.iter().map(|c| SheetCell::from(c.as_str())).collect())
                        .collect(),
                })
                .collect(),
            WorkbookPlan::TextContent { sheet_name, pages } => vec![SheetData {
                name: sheet_name.clone(),
                header: Some(vec!["Page".to_string(), "Content".to_string()]),
                rows: pages
                    .iter()
                    .map(|p| {
                        vec![
                            SheetCell::Number(f64::from(p.page)),
                            SheetCell::from(p.content.as_str()),
                        ]
                    })
                    .collect(),
            }],
        }
    }
}

/// Decide the sheet layout for one document.
///
/// Text fallback content always goes to a single `Text Content` sheet,
/// whatever `merge` says.
pub fn plan_workbook(content: ExtractedContent, merge: bool) -> Result<WorkbookPlan, PdfsheetError> {
    match content {
        ExtractedContent::Text(pages) => {
            if pages.is_empty() {
                return Err(PdfsheetError::NoExtractableContent);
            }
            Ok(WorkbookPlan::TextContent {
                sheet_name: TEXT_SHEET_NAME.to_string(),
                pages,
            })
        }
        ExtractedContent::Tables(tables) if tables.is_empty() => Err(PdfsheetError::NoTables),
        ExtractedContent::Tables(tables) if merge => Ok(plan_merged(&tables)),
        ExtractedContent::Tables(tables) => Ok(plan_separate(tables)),
    }
}

fn plan_merged(tables: &[NormalizedTable]) -> WorkbookPlan {
    let width = tables.iter().map(NormalizedTable::width).max().unwrap_or(1).max(1);

    let pad = |row: &[String]| {
        let mut out = row.to_vec();
        out.resize(width, String::new());
        out
    };

    let blocks = tables
        .iter()
        .map(|table| {
            let mut block = Vec::with_capacity(table.rows.len() + 2);
            block.push(pad(&table.columns));
            block.extend(table.rows.iter().map(|row| pad(row)));
            block.push(vec![String::new(); width]);
            block
        })
        .collect();

    WorkbookPlan::Merged {
        sheet_name: MERGED_SHEET_NAME.to_string(),
        width,
        blocks,
    }
}

fn plan_separate(tables: Vec<NormalizedTable>) -> WorkbookPlan {
    let mut namer = SheetNamer::new();
    let sheets = tables
        .into_iter()
        .map(|table| {
            let name = namer.claim(&table_sheet_name(table.page, table.index));
            (name, table)
        })
        .collect();
    WorkbookPlan::Separate { sheets }
}
