pub mod header;
pub mod normalize;

use crate::error::PdfsheetError;
use crate::extraction::PageContent;
use crate::model::{ExtractedContent, NormalizedTable, PageText, RawTable};
use header::resolve_header;
use normalize::normalize_table;

/// Turn extracted pages into normalized tables, or per-page text when the
/// document has no usable table at all.
///
/// Tables without rows, and header-only tables, are discarded. Fails with
/// `NoExtractableContent` when neither tables nor text are found.
pub fn parse_tables(pages: &[PageContent]) -> Result<ExtractedContent, PdfsheetError> {
    let tables: Vec<NormalizedTable> = pages
        .iter()
        .flat_map(|page| page.tables.iter())
        .filter_map(normalize_raw_table)
        .collect();

    if !tables.is_empty() {
        tracing::debug!(tables = tables.len(), "tables extracted");
        return Ok(ExtractedContent::Tables(tables));
    }

    let text: Vec<PageText> = pages
        .iter()
        .filter_map(|page| {
            let content = page.text.as_deref()?;
            (!content.is_empty()).then(|| PageText {
                page: page.page_number,
                content: content.to_string(),
            })
        })
        .collect();

    if text.is_empty() {
        return Err(PdfsheetError::NoExtractableContent);
    }

    tracing::debug!(pages = text.len(), "no tables found, falling back to page text");
    Ok(ExtractedContent::Text(text))
}

/// Normalize one raw table, or `None` when it carries no data rows.
pub fn normalize_raw_table(raw: &RawTable) -> Option<NormalizedTable> {
    if raw.is_empty() {
        tracing::debug!(page = raw.page, table = raw.index, "discarding empty table");
        return None;
    }

    let data = &raw.rows[1..];
    if data.is_empty() {
        tracing::debug!(
            page = raw.page,
            table = raw.index,
            "discarding header-only table"
        );
        return None;
    }

    let header = resolve_header(&raw.rows);
    Some(normalize_table(header, data, raw.page, raw.index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(number: u32, tables: Vec<RawTable>, text: Option<&str>) -> PageContent {
        PageContent {
            page_number: number,
            tables,
            text: text.map(str::to_string),
        }
    }

    #[test]
    fn test_ragged_example() {
        let raw = RawTable::from_text_rows(1, 1, &[vec!["A", "B"], vec!["1", "2"], vec!["3"]]);
        let table = normalize_raw_table(&raw).unwrap();
        assert_eq!(table.columns, vec!["A", "B"]);
        assert_eq!(table.rows, vec![vec!["1", "2"], vec!["3", ""]]);
    }

    #[test]
    fn test_header_only_and_empty_tables_discarded() {
        let pages = vec![page(
            1,
            vec![
                RawTable::new(1, 1, vec![]),
                RawTable::from_text_rows(1, 2, &[vec!["A", "B"]]),
                RawTable::from_text_rows(1, 3, &[vec!["X"], vec!["1"]]),
            ],
            None,
        )];
        let ExtractedContent::Tables(tables) = parse_tables(&pages).unwrap() else {
            panic!("expected tables");
        };
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].index, 3);
    }

    #[test]
    fn test_provenance_is_kept() {
        let pages = vec![
            page(1, vec![RawTable::from_text_rows(1, 1, &[vec!["A"], vec!["1"]])], None),
            page(4, vec![RawTable::from_text_rows(4, 2, &[vec!["B"], vec!["2"]])], None),
        ];
        let ExtractedContent::Tables(tables) = parse_tables(&pages).unwrap() else {
            panic!("expected tables");
        };
        assert_eq!((tables[1].page, tables[1].index), (4, 2));
    }

    #[test]
    fn test_text_fallback_keeps_non_empty_text_verbatim() {
        let pages = vec![
            page(1, vec![], Some("hello world")),
            page(2, vec![], Some("")),
            page(3, vec![RawTable::from_text_rows(3, 1, &[vec!["H"]])], Some("  more\n")),
            page(4, vec![], None),
        ];
        let content = parse_tables(&pages).unwrap();
        assert_eq!(
            content,
            ExtractedContent::Text(vec![
                PageText {
                    page: 1,
                    content: "hello world".into()
                },
                PageText {
                    page: 3,
                    content: "  more\n".into()
                },
            ])
        );
    }

    #[test]
    fn test_nothing_extractable_is_an_error() {
        let pages = vec![page(1, vec![], None), page(2, vec![], Some(""))];
        let err = parse_tables(&pages).unwrap_err();
        assert!(matches!(err, PdfsheetError::NoExtractableContent));
    }
}
