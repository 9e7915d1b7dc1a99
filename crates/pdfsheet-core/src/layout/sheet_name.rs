use std::collections::HashSet;

/// Spreadsheet applications reject sheet names longer than this.
pub const MAX_SHEET_NAME_LEN: usize = 31;

/// Name of the single sheet written in merge mode.
pub const MERGED_SHEET_NAME: &str = "All Tables";

/// Name of the sheet holding the plain-text fallback.
pub const TEXT_SHEET_NAME: &str = "Text Content";

/// `Page{page}_Table{table}`, cut to the sheet name limit.
pub fn table_sheet_name(page: u32, table: u32) -> String {
    truncate(&format!("Page{page}_Table{table}"), MAX_SHEET_NAME_LEN)
}

/// Hands out unique sheet names within one workbook.
///
/// Names are compared case-insensitively. A clash gets a `~2`, `~3`, ...
/// suffix, shortening the base so the result still fits the limit.
#[derive(Debug, Default)]
pub struct SheetNamer {
    taken: HashSet<String>,
}

impl SheetNamer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn claim(&mut self, wanted: &str) -> String {
        let base = truncate(wanted, MAX_SHEET_NAME_LEN);
        let base = if base.is_empty() { "Sheet".to_string() } else { base };

        if self.taken.insert(base.to_lowercase()) {
            return base;
        }

        let mut n = 2_usize;
        loop {
            let suffix = format!("~{n}");
            let room = MAX_SHEET_NAME_LEN - suffix.chars().count();
            let candidate = format!("{}{}", truncate(&base, room), suffix);
            if self.taken.insert(candidate.to_lowercase()) {
                tracing::debug!(wanted, name = %candidate, "sheet name collision resolved");
                return candidate;
            }
            n += 1;
        }
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
