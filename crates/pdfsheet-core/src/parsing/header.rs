use crate::model::RawCell;

/// Resolve the header row of a raw table.
///
/// Row 0 is used as-is when present, even if some of its cells are null;
/// null header cells become empty column names. Only when row 0 is absent
/// is a synthetic `Col0..ColN-1` header built, N being the length of row 1
/// (or 1 when there is no row 1).
pub fn resolve_header(rows: &[Vec<RawCell>]) -> Vec<String> {
    match rows.first() {
        Some(first) if !first.is_empty() => first
            .iter()
            .map(|cell| cell.clone().unwrap_or_default())
            .collect(),
        _ => synthetic_header(rows.get(1).map_or(1, Vec::len)),
    }
}

/// `Col0`, `Col1`, ... for `width` columns.
pub fn synthetic_header(width: usize) -> Vec<String> {
    (0..width).map(|i| format!("Col{i}")).collect()
}
