//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use pdfsheet_core::error::PdfsheetError;
use pdfsheet_core::extraction::{PageContent, PdfExtractor};
use pdfsheet_core::model::RawTable;

/// Returns the same pages for any input, so no poppler is needed.
pub struct MockExtractor {
    pub pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, PdfsheetError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

pub fn table_page(number: u32, tables: &[&[&[&str]]]) -> PageContent {
    PageContent {
        page_number: number,
        tables: tables
            .iter()
            .enumerate()
            .map(|(i, rows)| {
                let rows: Vec<Vec<&str>> = rows.iter().map(|r| r.to_vec()).collect();
                RawTable::from_text_rows(number, i as u32 + 1, &rows)
            })
            .collect(),
        text: None,
    }
}

pub fn text_page(number: u32, text: &str) -> PageContent {
    PageContent {
        page_number: number,
        tables: vec![],
        text: Some(text.to_string()),
    }
}

/// A Letter-sized PDF with `pages` pages, each showing one line of text.
pub fn build_pdf(pages: u32) -> Document {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 700.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Account number 4711 on page {n}"))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content encodes"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => pages as i64,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// Write a fixture PDF into `dir` and return its path.
pub fn write_pdf(dir: &Path, name: &str, pages: u32) -> PathBuf {
    let path = dir.join(name);
    let mut doc = build_pdf(pages);
    doc.save(&path).expect("fixture pdf saves");
    path
}
