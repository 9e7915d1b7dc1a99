//! Minimal Office Open XML (.xlsx) writer.
//!
//! A workbook is a zip package of XML parts. Only what a spreadsheet needs
//! to open the file is emitted: content types, package and workbook
//! relationships, a default stylesheet, the workbook part and one part per
//! worksheet. Strings are stored inline, so no shared-string table is kept.

use std::io::Write;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::PdfsheetError;
use crate::layout::{SheetCell, SheetData};

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const CT_WORKBOOK: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

/// Writer bound to one output path.
///
/// The package is assembled in a temporary file next to the target and
/// only moved into place by [`XlsxWriter::close`], so a failed conversion
/// never leaves a half-written workbook behind.
pub struct XlsxWriter {
    zip: ZipWriter<NamedTempFile>,
    path: PathBuf,
    sheet_names: Vec<String>,
}

impl XlsxWriter {
    pub fn create(path: &Path) -> Result<Self, PdfsheetError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;
        Ok(XlsxWriter {
            zip: ZipWriter::new(tmp),
            path: path.to_path_buf(),
            sheet_names: Vec::new(),
        })
    }

    /// Append a worksheet. The header row, when given, becomes row 1.
    pub fn write_sheet(&mut self, sheet: &SheetData) -> Result<(), PdfsheetError> {
        let xml = worksheet_xml(sheet)?;
        let part = format!("xl/worksheets/sheet{}.xml", self.sheet_names.len() + 1);
        self.zip.start_file(part, file_options())?;
        self.zip.write_all(&xml)?;
        self.sheet_names.push(sheet.name.clone());
        Ok(())
    }

    /// Write the package metadata and persist the workbook at its path.
    pub fn close(mut self) -> Result<(), PdfsheetError> {
        if self.sheet_names.is_empty() {
            return Err(PdfsheetError::NoTables);
        }

        let parts = [
            ("[Content_Types].xml", content_types_xml(self.sheet_names.len())?),
            ("_rels/.rels", package_rels_xml()?),
            ("xl/workbook.xml", workbook_xml(&self.sheet_names)?),
            (
                "xl/_rels/workbook.xml.rels",
                workbook_rels_xml(self.sheet_names.len())?,
            ),
            ("xl/styles.xml", STYLES_XML.as_bytes().to_vec()),
        ];
        for (name, bytes) in parts {
            self.zip.start_file(name, file_options())?;
            self.zip.write_all(&bytes)?;
        }

        let tmp = self.zip.finish()?;
        tmp.persist(&self.path).map_err(|e| PdfsheetError::Io(e.error))?;
        tracing::debug!(path = %self.path.display(), sheets = self.sheet_names.len(), "workbook written");
        Ok(())
    }
}

fn file_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

fn xml_error<E: std::fmt::Display>(e: E) -> PdfsheetError {
    PdfsheetError::Xml(e.to_string())
}

fn new_document() -> Result<Writer<Vec<u8>>, PdfsheetError> {
    let mut w = Writer::new(Vec::new());
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(xml_error)?;
    Ok(w)
}

fn start(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> Result<(), PdfsheetError> {
    let mut el = BytesStart::new(name);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    w.write_event(Event::Start(el)).map_err(xml_error)
}

fn empty(w: &mut Writer<Vec<u8>>, name: &str, attrs: &[(&str, &str)]) -> Result<(), PdfsheetError> {
    let mut el = BytesStart::new(name);
    for attr in attrs {
        el.push_attribute(*attr);
    }
    w.write_event(Event::Empty(el)).map_err(xml_error)
}

fn end(w: &mut Writer<Vec<u8>>, name: &str) -> Result<(), PdfsheetError> {
    w.write_event(Event::End(BytesEnd::new(name))).map_err(xml_error)
}

fn text(w: &mut Writer<Vec<u8>>, value: &str) -> Result<(), PdfsheetError> {
    w.write_event(Event::Text(BytesText::new(value))).map_err(xml_error)
}

fn worksheet_xml(sheet: &SheetData) -> Result<Vec<u8>, PdfsheetError> {
    let mut w = new_document()?;
    start(&mut w, "worksheet", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
    start(&mut w, "sheetData", &[])?;

    let header = sheet
        .header
        .as_ref()
        .map(|h| h.iter().map(|c| SheetCell::from(c.as_str())).collect::<Vec<_>>());
    let rows = header.iter().chain(sheet.rows.iter());

    for (r, row) in rows.enumerate() {
        if row.iter().all(SheetCell::is_blank) {
            continue;
        }
        let row_ref = (r + 1).to_string();
        start(&mut w, "row", &[("r", row_ref.as_str())])?;
        for (c, cell) in row.iter().enumerate() {
            if cell.is_blank() {
                continue;
            }
            let cell_ref = format!("{}{}", column_name(c), row_ref);
            match cell {
                SheetCell::Text(value) => {
                    start(&mut w, "c", &[("r", cell_ref.as_str()), ("t", "inlineStr")])?;
                    start(&mut w, "is", &[])?;
                    start(&mut w, "t", &[("xml:space", "preserve")])?;
                    text(&mut w, &xml_safe(value))?;
                    end(&mut w, "t")?;
                    end(&mut w, "is")?;
                }
                SheetCell::Number(value) => {
                    start(&mut w, "c", &[("r", cell_ref.as_str())])?;
                    start(&mut w, "v", &[])?;
                    text(&mut w, &value.to_string())?;
                    end(&mut w, "v")?;
                }
            }
            end(&mut w, "c")?;
        }
        end(&mut w, "row")?;
    }

    end(&mut w, "sheetData")?;
    end(&mut w, "worksheet")?;
    Ok(w.into_inner())
}

fn workbook_xml(sheet_names: &[String]) -> Result<Vec<u8>, PdfsheetError> {
    let mut w = new_document()?;
    start(&mut w, "workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
    start(&mut w, "sheets", &[])?;
    for (i, name) in sheet_names.iter().enumerate() {
        let id = (i + 1).to_string();
        let rel = format!("rId{id}");
        empty(
            &mut w,
            "sheet",
            &[("name", xml_safe(name).as_str()), ("sheetId", id.as_str()), ("r:id", rel.as_str())],
        )?;
    }
    end(&mut w, "sheets")?;
    end(&mut w, "workbook")?;
    Ok(w.into_inner())
}

fn workbook_rels_xml(sheet_count: usize) -> Result<Vec<u8>, PdfsheetError> {
    let mut w = new_document()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PKG_REL)])?;
    for i in 1..=sheet_count {
        let id = format!("rId{i}");
        let target = format!("worksheets/sheet{i}.xml");
        empty(
            &mut w,
            "Relationship",
            &[("Id", id.as_str()), ("Type", REL_WORKSHEET), ("Target", target.as_str())],
        )?;
    }
    let styles_id = format!("rId{}", sheet_count + 1);
    empty(
        &mut w,
        "Relationship",
        &[("Id", styles_id.as_str()), ("Type", REL_STYLES), ("Target", "styles.xml")],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

fn package_rels_xml() -> Result<Vec<u8>, PdfsheetError> {
    let mut w = new_document()?;
    start(&mut w, "Relationships", &[("xmlns", NS_PKG_REL)])?;
    empty(
        &mut w,
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_DOCUMENT), ("Target", "xl/workbook.xml")],
    )?;
    end(&mut w, "Relationships")?;
    Ok(w.into_inner())
}

fn content_types_xml(sheet_count: usize) -> Result<Vec<u8>, PdfsheetError> {
    let mut w = new_document()?;
    start(&mut w, "Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    empty(&mut w, "Default", &[("Extension", "rels"), ("ContentType", CT_RELS)])?;
    empty(&mut w, "Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    empty(
        &mut w,
        "Override",
        &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)],
    )?;
    for i in 1..=sheet_count {
        let part = format!("/xl/worksheets/sheet{i}.xml");
        empty(&mut w, "Override", &[("PartName", part.as_str()), ("ContentType", CT_WORKSHEET)])?;
    }
    empty(
        &mut w,
        "Override",
        &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)],
    )?;
    end(&mut w, "Types")?;
    Ok(w.into_inner())
}

/// Spreadsheet column letters: 0 -> A, 25 -> Z, 26 -> AA.
pub(crate) fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8(name).unwrap_or_default()
}

/// Drop characters XML 1.0 cannot carry (PDF text often has stray controls).
fn xml_safe(s: &str) -> String {
    s.chars()
        .filter(|&c| matches!(c, '\t' | '\n' | '\r') || (c >= ' ' && c != '\u{FFFE}' && c != '\u{FFFF}'))
        .collect()
}
