use crate::model::{RawCell, RawTable};

/// Reconstruct tables from layout-preserving page text.
///
/// `pdftotext -layout` keeps column alignment with runs of spaces, so a
/// table shows up as a block of consecutive lines that each split into two
/// or more cells. Column positions are taken from the widest line of the
/// block; shorter lines are aligned against them, leaving null holes where
/// a column is empty.
pub fn detect_tables(page_number: u32, text: &str) -> Vec<RawTable> {
    let mut tables = Vec::new();
    let mut block: Vec<Vec<Span>> = Vec::new();

    let flush = |block: &mut Vec<Vec<Span>>, tables: &mut Vec<RawTable>| {
        if block.len() >= 2 {
            let index = tables.len() as u32 + 1;
            tables.push(RawTable::new(page_number, index, align_block(block)));
        }
        block.clear();
    };

    for line in text.lines() {
        let spans = split_spans(line);
        if spans.len() >= 2 {
            block.push(spans);
        } else {
            flush(&mut block, &mut tables);
        }
    }
    flush(&mut block, &mut tables);

    tables
}

/// A cell found on a line, with its starting character column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Span {
    pub start: usize,
    pub text: String,
}

/// Split a line into cells on tabs or runs of two or more spaces.
pub(crate) fn split_spans(line: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut current = String::new();
    let mut start = 0;
    let mut whitespace_run = 0_usize;

    for (col, ch) in line.chars().enumerate() {
        if ch == '\t' || (ch.is_whitespace() && whitespace_run >= 1) {
            whitespace_run += 1;
            let text = current.trim();
            if !text.is_empty() {
                spans.push(Span {
                    start,
                    text: text.to_string(),
                });
            }
            current.clear();
            continue;
        }

        if ch.is_whitespace() {
            whitespace_run += 1;
            current.push(' ');
            continue;
        }

        if current.trim().is_empty() {
            current.clear();
            start = col;
        }
        whitespace_run = 0;
        current.push(ch);
    }

    let text = current.trim();
    if !text.is_empty() {
        spans.push(Span {
            start,
            text: text.to_string(),
        });
    }

    spans
}

fn align_block(block: &[Vec<Span>]) -> Vec<Vec<RawCell>> {
    let anchors: Vec<usize> = block
        .iter()
        .max_by_key(|spans| spans.len())
        .map(|spans| spans.iter().map(|s| s.start).collect())
        .unwrap_or_default();

    block
        .iter()
        .map(|spans| {
            if spans.len() == anchors.len() {
                return spans.iter().map(|s| Some(s.text.clone())).collect();
            }

            // Spans past the last anchor widen the row; normalization then
            // extends the header so the cell is kept.
            let mut row: Vec<RawCell> = vec![None; anchors.len()];
            let mut next_free = 0;
            for span in spans {
                let col = nearest_anchor(&anchors, span.start).max(next_free);
                if col < row.len() {
                    row[col] = Some(span.text.clone());
                } else {
                    row.push(Some(span.text.clone()));
                }
                next_free = col + 1;
            }

            while row.last().is_some_and(Option::is_none) {
                row.pop();
            }
            row
        })
        .collect()
}

fn nearest_anchor(anchors: &[usize], start: usize) -> usize {
    anchors
        .iter()
        .enumerate()
        .min_by_key(|(_, anchor)| anchor.abs_diff(start))
        .map_or(0, |(i, _)| i)
}
