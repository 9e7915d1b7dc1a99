use lopdf::Document;

use crate::error::PdfsheetError;
use crate::extraction::table::split_spans;
use crate::extraction::{PageContent, PdfExtractor};

/// Pure-Rust extraction backend built on `lopdf` and `pdf-extract`.
///
/// Each page gets two text candidates: lopdf's per-page extraction and the
/// matching page of pdf-extract's whole-document output (when its page count
/// lines up). The candidate that looks most tabular wins.
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn new() -> Self {
        LopdfExtractor
    }
}

impl Default for LopdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for LopdfExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, PdfsheetError> {
        let document = Document::load_mem(pdf_bytes)?;
        let pages_map = document.get_pages();

        let whole = match pdf_extract::extract_text_from_mem(pdf_bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::debug!("pdf-extract failed: {e}");
                None
            }
        };
        let split: Option<Vec<String>> = whole.as_deref().and_then(|text| {
            let mut pages: Vec<String> = text.split('\x0c').map(str::to_string).collect();
            if pages.last().is_some_and(|p| p.trim().is_empty()) {
                pages.pop();
            }
            (pages.len() == pages_map.len()).then_some(pages)
        });

        let mut pages = Vec::with_capacity(pages_map.len());
        for (index, page_no) in pages_map.keys().enumerate() {
            let mut candidates = Vec::new();
            if let Some(text) = split.as_ref().and_then(|p| p.get(index)) {
                candidates.push(text.clone());
            }
            if let Ok(text) = document.extract_text(&[*page_no]) {
                candidates.push(text);
            }

            let text = candidates
                .into_iter()
                .filter(|t| !t.trim().is_empty())
                .max_by_key(|t| tabular_score(t))
                .unwrap_or_default();
            pages.push(PageContent::from_layout_text(*page_no, &text));
        }

        tracing::debug!(pages = pages.len(), "lopdf extraction finished");
        Ok(pages)
    }

    fn backend_name(&self) -> &str {
        "lopdf"
    }
}

/// Favour text whose lines split into several aligned cells.
fn tabular_score(text: &str) -> i64 {
    let mut score = 0_i64;
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        score += 1;
        if split_spans(line).len() >= 2 {
            score += 50;
        }
    }
    score
}
