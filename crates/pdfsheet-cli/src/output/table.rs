use pdfsheet_core::annotate::Annotation;
use pdfsheet_core::batch::{BatchEvent, FileOutcome};
use pdfsheet_core::layout::{SheetCell, WorkbookPlan};

/// Longest cell value shown before truncating.
const MAX_CELL_WIDTH: usize = 24;

/// Number of data rows previewed per sheet.
const PREVIEW_ROWS: usize = 5;

pub fn print_event(event: &BatchEvent) {
    match event {
        BatchEvent::FileFinished {
            index,
            total,
            outcome,
        } => match outcome {
            FileOutcome::Converted(report) => {
                let what = if report.text_fallback {
                    format!("{} page(s) of text", report.rows)
                } else {
                    format!("{} table(s), {} row(s)", report.tables, report.rows)
                };
                eprintln!(
                    "[{}/{}] {} -> {} ({what})",
                    index + 1,
                    total,
                    report.input.display(),
                    report.output.display()
                );
            }
            FileOutcome::Failed(failure) => {
                eprintln!(
                    "[{}/{}] {} FAILED: {}",
                    index + 1,
                    total,
                    failure.file_name,
                    failure.message
                );
            }
        },
        BatchEvent::Finished { converted, failed } => {
            println!("Converted {converted} file(s), {failed} failed");
        }
    }
}

pub fn format_plan(plan: &WorkbookPlan) -> String {
    let mut out = String::new();
    let layout = match plan {
        WorkbookPlan::Merged { .. } => "merged",
        WorkbookPlan::Separate { .. } => "one sheet per table",
        WorkbookPlan::TextContent { .. } => "text only, no tables found",
    };
    out.push_str(&format!(
        "Layout: {layout} ({} table(s), {} row(s))\n",
        plan.table_count(),
        plan.data_row_count()
    ));

    for sheet in plan.sheets() {
        out.push_str(&format!("\n=== {} ===\n", sheet.name));
        if let Some(header) = &sheet.header {
            let cells: Vec<String> = header.iter().map(|c| truncate(c)).collect();
            out.push_str(&format!("  {}\n", cells.join(" | ")));
        }
        for row in sheet.rows.iter().take(PREVIEW_ROWS) {
            let cells: Vec<String> = row
                .iter()
                .map(|c| match c {
                    SheetCell::Text(s) => truncate(s),
                    SheetCell::Number(n) => n.to_string(),
                })
                .collect();
            out.push_str(&format!("  {}\n", cells.join(" | ")));
        }
        if sheet.rows.len() > PREVIEW_ROWS {
            out.push_str(&format!(
                "  ... {} more row(s)\n",
                sheet.rows.len() - PREVIEW_ROWS
            ));
        }
    }
    out
}

pub fn format_annotations(listing: &[(u32, Vec<Annotation>)]) -> String {
    let mut out = String::new();
    for (page, annots) in listing {
        if annots.is_empty() {
            if listing.len() == 1 {
                out.push_str(&format!("Page {page}: no annotations\n"));
            }
            continue;
        }
        out.push_str(&format!("Page {page}:\n"));
        for annot in annots {
            out.push_str(&format!("  {annot}\n"));
        }
    }
    if out.is_empty() {
        out.push_str("No annotations\n");
    }
    out
}

fn truncate(s: &str) -> String {
    let s = s.replace('\n', " ");
    if s.chars().count() <= MAX_CELL_WIDTH {
        s
    } else {
        let short: String = s.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{short}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pdfsheet_core::model::PageText;

    #[test]
    fn test_truncate_long_cell() {
        assert_eq!(truncate("short"), "short");
        let long = "x".repeat(40);
        let t = truncate(&long);
        assert_eq!(t.chars().count(), MAX_CELL_WIDTH);
        assert!(t.ends_with("..."));
    }

    #[test]
    fn test_format_text_plan() {
        let plan = WorkbookPlan::TextContent {
            sheet_name: "Text Content".into(),
            pages: vec![PageText {
                page: 1,
                content: "hello\nworld".into(),
            }],
        };
        let out = format_plan(&plan);
        assert!(out.contains("=== Text Content ==="));
        assert!(out.contains("Page | Content"));
        assert!(out.contains("1 | hello world"));
    }

    #[test]
    fn test_format_empty_listing() {
        assert_eq!(format_annotations(&[(2, vec![])]), "Page 2: no annotations\n");
        assert_eq!(format_annotations(&[]), "No annotations\n");
    }
}
