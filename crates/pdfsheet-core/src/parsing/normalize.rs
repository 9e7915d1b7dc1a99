use crate::model::{NormalizedTable, RawCell};

/// Reconcile a header and ragged data rows into a rectangular table.
///
/// Steps:
/// 1. Header texts become column names verbatim (duplicates kept)
/// 2. Null cells become empty strings
/// 3. Short rows are right-padded with empty strings
/// 4. Rows longer than the header keep their extra cells; the header is
///    extended with empty names so no data is dropped
pub fn normalize_table(
    header: Vec<String>,
    data: &[Vec<RawCell>],
    page: u32,
    index: u32,
) -> NormalizedTable {
    let mut columns = header;

    let widest = data.iter().map(Vec::len).max().unwrap_or(0);
    if widest > columns.len() {
        tracing::warn!(
            page,
            table = index,
            header = columns.len(),
            widest,
            "data rows wider than header, adding unnamed columns"
        );
        columns.resize(widest, String::new());
    }

    let width = columns.len();
    let rows = data
        .iter()
        .map(|row| {
            let mut out: Vec<String> = row
                .iter()
                .map(|cell| cell.clone().unwrap_or_default())
                .collect();
            out.resize(width, String::new());
            out
        })
        .collect();

    NormalizedTable {
        columns,
        rows,
        page,
        index,
    }
}
