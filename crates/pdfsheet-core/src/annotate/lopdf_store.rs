//! Annotation store backed by a PDF file, read and written with `lopdf`.
//!
//! Annotations live in each page's `/Annots` array. Geometry is converted
//! between the top-left document space used by the editor and PDF user
//! space (origin bottom-left) with the page's `MediaBox`.

use std::path::Path;

use lopdf::content::Content;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tempfile::NamedTempFile;

use super::geometry::{Point, Rect};
use super::redact::{redact_content, PdfRect};
use super::shape::{Annotation, Color, ShapeKind, ShapeStyle, DEFAULT_FONT_SIZE};
use super::store::{check_page, AnnotationStore};
use super::Xref;
use crate::error::PdfsheetError;

/// Annotation flag: print the annotation with the page.
const FLAG_PRINT: i64 = 4;

/// US Letter, used when a page carries no usable `MediaBox`.
const FALLBACK_MEDIA_BOX: PdfRect = [0.0, 0.0, 612.0, 792.0];

pub struct LopdfStore {
    doc: Document,
    page_ids: Vec<ObjectId>,
}

/// Where a page sits in PDF user space.
#[derive(Debug, Clone, Copy)]
struct PageFrame {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl PageFrame {
    fn from_media_box(b: PdfRect) -> Self {
        Self {
            left: b[0],
            top: b[3],
            width: b[2] - b[0],
            height: b[3] - b[1],
        }
    }

    fn to_pdf(&self, p: Point) -> (f64, f64) {
        (p.x + self.left, self.top - p.y)
    }

    fn from_pdf(&self, x: f64, y: f64) -> Point {
        Point::new(x - self.left, self.top - y)
    }

    fn rect_to_pdf(&self, r: &Rect) -> PdfRect {
        [
            r.x0 + self.left,
            self.top - r.y1,
            r.x1 + self.left,
            self.top - r.y0,
        ]
    }

    fn rect_from_pdf(&self, r: PdfRect) -> Rect {
        Rect::from_corners(self.from_pdf(r[0], r[1]), self.from_pdf(r[2], r[3]))
    }
}

impl LopdfStore {
    pub fn open(path: &Path) -> Result<Self, PdfsheetError> {
        Ok(Self::from_document(Document::load(path)?))
    }

    pub fn load_mem(bytes: &[u8]) -> Result<Self, PdfsheetError> {
        Ok(Self::from_document(Document::load_mem(bytes)?))
    }

    pub fn from_document(doc: Document) -> Self {
        let page_ids = doc.get_pages().into_values().collect();
        Self { doc, page_ids }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn page_id(&self, page: u32) -> Result<ObjectId, PdfsheetError> {
        check_page(page, self.page_count())?;
        Ok(self.page_ids[page as usize - 1])
    }

    fn frame(&self, page_id: ObjectId) -> PageFrame {
        let media_box = inherited(&self.doc, page_id, b"MediaBox").and_then(rect_array);
        if media_box.is_none() {
            tracing::debug!(?page_id, "no MediaBox, assuming US Letter");
        }
        PageFrame::from_media_box(media_box.unwrap_or(FALLBACK_MEDIA_BOX))
    }

    fn page_dict(&self, page_id: ObjectId) -> Result<&Dictionary, PdfsheetError> {
        Ok(self.doc.get_object(page_id).and_then(Object::as_dict)?)
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary, PdfsheetError> {
        Ok(self.doc.get_object_mut(page_id).and_then(Object::as_dict_mut)?)
    }

    /// Raw `/Annots` entries of a page, references and inline dictionaries.
    fn annots_entries(&self, page_id: ObjectId) -> Result<Vec<Object>, PdfsheetError> {
        let page = self.page_dict(page_id)?;
        let Ok(annots) = page.get(b"Annots") else {
            return Ok(Vec::new());
        };
        Ok(resolve(&self.doc, annots)
            .as_array()
            .map(|items| items.to_vec())
            .unwrap_or_default())
    }

    fn annot_ids(&self, page_id: ObjectId) -> Result<Vec<ObjectId>, PdfsheetError> {
        Ok(self
            .annots_entries(page_id)?
            .iter()
            .filter_map(|o| o.as_reference().ok())
            .collect())
    }

    fn set_annots_entries(
        &mut self,
        page_id: ObjectId,
        entries: Vec<Object>,
    ) -> Result<(), PdfsheetError> {
        let page = self.page_dict_mut(page_id)?;
        if entries.is_empty() {
            page.remove(b"Annots");
        } else {
            page.set("Annots", Object::Array(entries));
        }
        Ok(())
    }

    fn find_annot(&self, page: u32, xref: Xref) -> Result<(ObjectId, ObjectId), PdfsheetError> {
        let page_id = self.page_id(page)?;
        let annot_id = self
            .annot_ids(page_id)?
            .into_iter()
            .find(|id| id.0 == xref.0)
            .ok_or(PdfsheetError::AnnotationNotFound(xref))?;
        Ok((page_id, annot_id))
    }

    fn annot_dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary, PdfsheetError> {
        self.doc
            .get_object_mut(id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| PdfsheetError::MalformedAnnotation {
                xref: Xref(id.0),
                reason: e.to_string(),
            })
    }

    fn read_annotation(&self, frame: &PageFrame, id: ObjectId) -> Option<Annotation> {
        let dict = self.doc.get_object(id).and_then(Object::as_dict).ok()?;
        let subtype = dict
            .get(b"Subtype")
            .and_then(Object::as_name)
            .map(|n| String::from_utf8_lossy(n).into_owned())
            .ok()?;
        if subtype == "Popup" {
            return None;
        }
        let rect = dict
            .get(b"Rect")
            .ok()
            .and_then(|o| rect_array(resolve(&self.doc, o)))
            .map(|r| frame.rect_from_pdf(r))?;

        let mut style = read_style(&self.doc, dict);
        let mut contents = text_entry(dict, b"Contents");

        let kind = match subtype.as_str() {
            "Line" => match dict.get(b"L").ok().and_then(numbers) {
                Some(l) if l.len() == 4 => ShapeKind::Line {
                    start: frame.from_pdf(l[0], l[1]),
                    end: frame.from_pdf(l[2], l[3]),
                },
                _ => ShapeKind::Other {
                    subtype: subtype.clone(),
                    rect,
                },
            },
            "Square" => ShapeKind::Rectangle { rect },
            "Circle" => ShapeKind::Circle { rect },
            "Highlight" => ShapeKind::Highlight { rect },
            "FreeText" => {
                let da = text_entry(dict, b"DA").unwrap_or_default();
                let (text_color, font_size) = parse_default_appearance(&da);
                // For text boxes /C is the background, the text colour is in /DA.
                style.fill = style.fill.or(color_entry(&self.doc, dict, b"C"));
                style.color = text_color.unwrap_or(Color::BLACK);
                ShapeKind::FreeText {
                    rect,
                    text: contents.take().unwrap_or_default(),
                    font_size: font_size.unwrap_or(DEFAULT_FONT_SIZE),
                }
            }
            "Text" => ShapeKind::StickyNote {
                point: rect.top_left(),
                text: contents.take().unwrap_or_default(),
            },
            "Redact" => ShapeKind::Redaction { rect },
            _ => ShapeKind::Other {
                subtype: subtype.clone(),
                rect,
            },
        };

        Some(Annotation {
            xref: Xref(id.0),
            kind,
            style,
            contents,
        })
    }
}

impl AnnotationStore for LopdfStore {
    fn page_count(&self) -> u32 {
        self.page_ids.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<(f64, f64), PdfsheetError> {
        let frame = self.frame(self.page_id(page)?);
        Ok((frame.width, frame.height))
    }

    fn annotations(&self, page: u32) -> Result<Vec<Annotation>, PdfsheetError> {
        let page_id = self.page_id(page)?;
        let frame = self.frame(page_id);
        let annots: Vec<Annotation> = self
            .annot_ids(page_id)?
            .into_iter()
            .filter_map(|id| self.read_annotation(&frame, id))
            .collect();
        tracing::debug!(page, count = annots.len(), "annotations read");
        Ok(annots)
    }

    fn add(
        &mut self,
        page: u32,
        kind: ShapeKind,
        style: &ShapeStyle,
    ) -> Result<Xref, PdfsheetError> {
        let page_id = self.page_id(page)?;
        let frame = self.frame(page_id);

        let mut dict = dictionary! {
            "Type" => "Annot",
            "Subtype" => subtype_name(&kind),
            "F" => FLAG_PRINT,
            "P" => page_id,
            "CA" => real(style.opacity),
            "BS" => dictionary! { "W" => i64::from(style.width) },
        };
        write_appearance(&mut dict, &kind, style);
        write_geometry(&mut dict, &frame, &kind, style.width);

        let id = self.doc.add_object(dict);
        let mut entries = self.annots_entries(page_id)?;
        entries.push(Object::Reference(id));
        self.set_annots_entries(page_id, entries)?;

        tracing::debug!(page, xref = id.0, kind = kind.label(), "annotation added");
        Ok(Xref(id.0))
    }

    fn update(&mut self, page: u32, xref: Xref, kind: &ShapeKind) -> Result<(), PdfsheetError> {
        let (page_id, annot_id) = self.find_annot(page, xref)?;
        let frame = self.frame(page_id);
        let width = {
            let dict = self.doc.get_object(annot_id).and_then(Object::as_dict)?;
            read_style(&self.doc, dict).width
        };
        let dict = self.annot_dict_mut(annot_id)?;
        write_geometry(dict, &frame, kind, width);
        // Appearance streams describe the old position; viewers rebuild them.
        dict.remove(b"AP");
        Ok(())
    }

    fn delete(&mut self, page: u32, xref: Xref) -> Result<(), PdfsheetError> {
        let (page_id, annot_id) = self.find_annot(page, xref)?;
        let popup = self
            .doc
            .get_object(annot_id)
            .and_then(Object::as_dict)
            .and_then(|d| d.get(b"Popup"))
            .and_then(Object::as_reference)
            .ok();

        let mut entries = self.annots_entries(page_id)?;
        entries.retain(|o| {
            let id = o.as_reference().ok();
            id != Some(annot_id) && (popup.is_none() || id != popup)
        });
        self.set_annots_entries(page_id, entries)?;

        self.doc.objects.remove(&annot_id);
        if let Some(popup) = popup {
            self.doc.objects.remove(&popup);
        }
        tracing::debug!(page, %xref, "annotation deleted");
        Ok(())
    }

    fn apply_redactions(&mut self, page: u32) -> Result<usize, PdfsheetError> {
        let page_id = self.page_id(page)?;

        let mut targets = Vec::new();
        for id in self.annot_ids(page_id)? {
            let Ok(dict) = self.doc.get_object(id).and_then(Object::as_dict) else {
                continue;
            };
            let is_redact = dict
                .get(b"Subtype")
                .and_then(Object::as_name)
                .is_ok_and(|n| n == b"Redact");
            let rect = dict
                .get(b"Rect")
                .ok()
                .and_then(|o| rect_array(resolve(&self.doc, o)));
            if let (true, Some(rect)) = (is_redact, rect) {
                targets.push((id, rect));
            }
        }
        if targets.is_empty() {
            return Ok(0);
        }

        let rects: Vec<PdfRect> = targets.iter().map(|(_, r)| *r).collect();
        let content = Content::decode(&self.doc.get_page_content(page_id)?)?;
        let (content, dropped) = redact_content(content, &rects);
        let stream_id = self
            .doc
            .add_object(Stream::new(dictionary! {}, content.encode()?));
        self.page_dict_mut(page_id)?
            .set("Contents", Object::Reference(stream_id));

        let redact_ids: Vec<ObjectId> = targets.iter().map(|(id, _)| *id).collect();
        let mut entries = self.annots_entries(page_id)?;
        entries.retain(|o| o.as_reference().map_or(true, |id| !redact_ids.contains(&id)));
        self.set_annots_entries(page_id, entries)?;
        for id in &redact_ids {
            self.doc.objects.remove(id);
        }

        tracing::info!(page, areas = rects.len(), dropped, "redactions applied");
        Ok(rects.len())
    }

    fn save(&mut self, path: &Path) -> Result<(), PdfsheetError> {
        self.doc.prune_objects();
        self.doc.compress();

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        self.doc.save_to(&mut tmp)?;
        tmp.persist(path).map_err(|e| PdfsheetError::Io(e.error))?;
        tracing::info!(path = %path.display(), "PDF saved");
        Ok(())
    }
}

fn subtype_name(kind: &ShapeKind) -> &str {
    match kind {
        ShapeKind::Line { .. } => "Line",
        ShapeKind::Rectangle { .. } => "Square",
        ShapeKind::Circle { .. } => "Circle",
        ShapeKind::Highlight { .. } => "Highlight",
        ShapeKind::FreeText { .. } => "FreeText",
        ShapeKind::StickyNote { .. } => "Text",
        ShapeKind::Redaction { .. } => "Redact",
        ShapeKind::Other { subtype, .. } => subtype,
    }
}

/// Colours and text appearance, written once when the annotation is created.
fn write_appearance(dict: &mut Dictionary, kind: &ShapeKind, style: &ShapeStyle) {
    match kind {
        ShapeKind::FreeText { font_size, .. } => {
            let [r, g, b] = style.color.channels();
            let da = format!("{r:.3} {g:.3} {b:.3} rg /Helv {font_size} Tf");
            dict.set("DA", Object::string_literal(da));
            dict.set("C", color_object(style.fill.unwrap_or(Color::WHITE)));
        }
        ShapeKind::Redaction { .. } => {
            dict.set("IC", color_object(Color::BLACK));
            dict.set("C", color_object(Color::RED));
        }
        ShapeKind::StickyNote { .. } => {
            dict.set("Name", "Note");
            dict.set("C", color_object(style.color));
        }
        _ => {
            dict.set("C", color_object(style.color));
            if let Some(fill) = style.fill {
                dict.set("IC", color_object(fill));
            }
        }
    }
}

/// Position entries: `/Rect` plus the subtype's own coordinates.
fn write_geometry(dict: &mut Dictionary, frame: &PageFrame, kind: &ShapeKind, width: u32) {
    let bounds = Annotation {
        xref: Xref(0),
        kind: kind.clone(),
        style: ShapeStyle {
            width,
            ..ShapeStyle::default()
        },
        contents: None,
    }
    .bounding_rect();
    dict.set("Rect", rect_object(frame.rect_to_pdf(&bounds)));

    match kind {
        ShapeKind::Line { start, end } => {
            let (x1, y1) = frame.to_pdf(*start);
            let (x2, y2) = frame.to_pdf(*end);
            dict.set("L", reals(&[x1, y1, x2, y2]));
        }
        ShapeKind::Highlight { rect } => {
            let [x0, y0, x1, y1] = frame.rect_to_pdf(rect);
            dict.set("QuadPoints", reals(&[x0, y1, x1, y1, x0, y0, x1, y0]));
        }
        ShapeKind::FreeText { text, .. } | ShapeKind::StickyNote { text, .. } => {
            dict.set("Contents", text_object(text));
        }
        _ => {}
    }
}

fn read_style(doc: &Document, dict: &Dictionary) -> ShapeStyle {
    let width = dict
        .get(b"BS")
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|bs| bs.as_dict().ok())
        .and_then(|bs| bs.get(b"W").ok())
        .and_then(number)
        .or_else(|| {
            dict.get(b"Border")
                .ok()
                .and_then(numbers)
                .and_then(|b| b.get(2).copied())
        })
        .unwrap_or(1.0);

    ShapeStyle {
        color: color_entry(doc, dict, b"C").unwrap_or(Color::BLACK),
        fill: color_entry(doc, dict, b"IC"),
        opacity: dict
            .get(b"CA")
            .ok()
            .and_then(number)
            .unwrap_or(1.0)
            .clamp(0.0, 1.0),
        width: if width >= 0.5 {
            width.round() as u32
        } else {
            ShapeStyle::default().width
        },
    }
}

fn color_entry(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Color> {
    let values = numbers(resolve(doc, dict.get(key).ok()?))?;
    match values.as_slice() {
        [g] => Some(Color::rgb(*g, *g, *g)),
        [r, g, b] => Some(Color::rgb(*r, *g, *b)),
        [c, m, y, k] => Some(Color::rgb(
            (1.0 - c) * (1.0 - k),
            (1.0 - m) * (1.0 - k),
            (1.0 - y) * (1.0 - k),
        )),
        _ => None,
    }
}

/// Text colour and font size from a `/DA` string like `0 0 1 rg /Helv 12 Tf`.
fn parse_default_appearance(da: &str) -> (Option<Color>, Option<u32>) {
    let tokens: Vec<&str> = da.split_whitespace().collect();
    let mut color = None;
    let mut size = None;
    for (i, token) in tokens.iter().enumerate() {
        match *token {
            "rg" if i >= 3 => {
                let channel = |j: usize| tokens[j].parse::<f64>().ok();
                if let (Some(r), Some(g), Some(b)) = (channel(i - 3), channel(i - 2), channel(i - 1))
                {
                    color = Some(Color::rgb(r, g, b));
                }
            }
            "g" if i >= 1 => {
                if let Ok(v) = tokens[i - 1].parse::<f64>() {
                    color = Some(Color::rgb(v, v, v));
                }
            }
            "Tf" if i >= 1 => {
                size = tokens[i - 1]
                    .parse::<f64>()
                    .ok()
                    .filter(|s| *s > 0.0)
                    .map(|s| s.round() as u32);
            }
            _ => {}
        }
    }
    (color, size)
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

/// Look a key up on a page or, failing that, its ancestors in the page tree.
fn inherited<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let mut current = page_id;
    // Bounded walk; malformed files can contain /Parent cycles.
    for _ in 0..64 {
        let dict = doc.get_object(current).and_then(Object::as_dict).ok()?;
        if let Ok(value) = dict.get(key) {
            return Some(resolve(doc, value));
        }
        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }
    None
}

fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn numbers(obj: &Object) -> Option<Vec<f64>> {
    obj.as_array().ok()?.iter().map(number).collect()
}

fn rect_array(obj: &Object) -> Option<PdfRect> {
    match numbers(obj)?.as_slice() {
        [x0, y0, x1, y1] => Some([x0.min(*x1), y0.min(*y1), x0.max(*x1), y0.max(*y1)]),
        _ => None,
    }
}

fn real(v: f64) -> Object {
    Object::Real(v as f32)
}

fn reals(values: &[f64]) -> Object {
    Object::Array(values.iter().map(|v| real(*v)).collect())
}

fn rect_object(r: PdfRect) -> Object {
    reals(&r)
}

fn color_object(c: Color) -> Object {
    reals(&c.channels())
}

fn text_entry(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key).ok()? {
        Object::String(bytes, _) => Some(decode_text(bytes)),
        _ => None,
    }
}

/// PDF text strings: UTF-16BE with a byte order mark, otherwise PDFDocEncoding.
fn decode_text(bytes: &[u8]) -> String {
    Document::decode_text(None, bytes)
}

fn text_object(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::Operation;

    /// One page whose MediaBox is inherited from the page tree, with two
    /// lines of text at y = 780 and y = 764.
    fn fixture() -> LopdfStore {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("TL", vec![16.into()]),
                Operation::new("Td", vec![50.into(), 780.into()]),
                Operation::new("Tj", vec![Object::string_literal("Confidential")]),
                Operation::new("T*", vec![]),
                Operation::new("Tj", vec![Object::string_literal("Visible")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        LopdfStore::from_document(doc)
    }

    fn shown_text(store: &LopdfStore) -> Vec<String> {
        let page_id = store.page_ids[0];
        let content = Content::decode(&store.doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(decode_text(bytes)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_page_size_from_inherited_media_box() {
        let store = fixture();
        assert_eq!(store.page_count(), 1);
        assert_eq!(store.page_size(1).unwrap(), (612.0, 792.0));
    }

    #[test]
    fn test_rectangle_written_in_pdf_space() {
        let mut store = fixture();
        let rect = Rect::new(100.0, 50.0, 200.0, 150.0);
        let style = ShapeStyle {
            fill: Some(Color::YELLOW),
            ..ShapeStyle::default()
        };
        let xref = store.add(1, ShapeKind::Rectangle { rect }, &style).unwrap();

        let dict = store.doc.get_object((xref.0, 0)).unwrap().as_dict().unwrap();
        assert_eq!(dict.get(b"Subtype").unwrap().as_name().unwrap(), b"Square");
        assert_eq!(
            rect_array(dict.get(b"Rect").unwrap()),
            Some([100.0, 642.0, 200.0, 742.0])
        );

        let annots = store.annotations(1).unwrap();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].xref, xref);
        assert_eq!(annots[0].kind, ShapeKind::Rectangle { rect });
        assert_eq!(annots[0].style.fill, Some(Color::YELLOW));
        assert_eq!(annots[0].style.color, Color::RED);
        assert_eq!(annots[0].style.width, 2);
    }

    #[test]
    fn test_line_update_moves_endpoints() {
        let mut store = fixture();
        let line = ShapeKind::Line {
            start: Point::new(10.0, 10.0),
            end: Point::new(110.0, 60.0),
        };
        let xref = store.add(1, line.clone(), &ShapeStyle::default()).unwrap();
        let moved = line.translated(5.0, 5.0);
        store.update(1, xref, &moved).unwrap();
        assert_eq!(store.annotations(1).unwrap()[0].kind, moved);
    }

    #[test]
    fn test_free_text_round_trip() {
        let mut store = fixture();
        let kind = ShapeKind::free_text(Point::new(20.0, 30.0), "Grüße", 14);
        let style = ShapeStyle {
            color: Color::rgb(0.0, 0.0, 1.0),
            ..ShapeStyle::default()
        };
        store.add(1, kind.clone(), &style).unwrap();
        let annot = &store.annotations(1).unwrap()[0];
        let (ShapeKind::FreeText { rect: want, .. }, ShapeKind::FreeText { rect, text, font_size }) =
            (&kind, &annot.kind)
        else {
            panic!("expected free text, got {:?}", annot.kind);
        };
        assert_eq!(text, "Grüße");
        assert_eq!(*font_size, 14);
        // Coordinates are stored as single-precision reals.
        for (a, b) in [(rect.x0, want.x0), (rect.y0, want.y0), (rect.x1, want.x1), (rect.y1, want.y1)] {
            assert!((a - b).abs() < 1e-3, "{a} vs {b}");
        }
        assert_eq!(annot.style.color, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(annot.style.fill, Some(Color::WHITE));
    }

    #[test]
    fn test_delete_and_foreign_annotations() {
        let mut store = fixture();
        let page_id = store.page_ids[0];
        let link = store.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => vec![0.into(), 0.into(), 10.into(), 10.into()],
        });
        store
            .set_annots_entries(page_id, vec![Object::Reference(link)])
            .unwrap();
        let note = store
            .add(
                1,
                ShapeKind::StickyNote {
                    point: Point::new(300.0, 300.0),
                    text: "check".into(),
                },
                &ShapeStyle::default(),
            )
            .unwrap();

        let annots = store.annotations(1).unwrap();
        assert_eq!(annots.len(), 2);
        assert!(matches!(&annots[0].kind, ShapeKind::Other { subtype, .. } if subtype == "Link"));
        assert_eq!(annots[0].bounding_rect(), Rect::new(0.0, 782.0, 10.0, 792.0));

        store.delete(1, note).unwrap();
        assert_eq!(store.annotations(1).unwrap().len(), 1);
        assert!(matches!(
            store.delete(1, note),
            Err(PdfsheetError::AnnotationNotFound(_))
        ));
    }

    #[test]
    fn test_zero_border_width_and_unicode_contents() {
        let mut store = fixture();
        let page_id = store.page_ids[0];
        let mut contents = vec![0xFE, 0xFF];
        for unit in "Grüße ✓".encode_utf16() {
            contents.extend_from_slice(&unit.to_be_bytes());
        }
        let square = store.doc.add_object(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Square",
            "Rect" => vec![10.into(), 10.into(), 50.into(), 50.into()],
            "BS" => dictionary! { "W" => 0 },
            "Contents" => Object::String(contents, StringFormat::Hexadecimal),
        });
        store
            .set_annots_entries(page_id, vec![Object::Reference(square)])
            .unwrap();

        let annots = store.annotations(1).unwrap();
        assert_eq!(annots[0].style.width, ShapeStyle::default().width);
        assert_eq!(annots[0].text(), Some("Grüße ✓"));
    }

    #[test]
    fn test_apply_redactions_removes_text_and_annotation() {
        let mut store = fixture();
        // Document space: the first text line sits at y = 792 - 780 = 12.
        let rect = Rect::new(40.0, 5.0, 250.0, 16.0);
        store
            .add(1, ShapeKind::Redaction { rect }, &ShapeStyle::default())
            .unwrap();

        assert_eq!(store.apply_redactions(1).unwrap(), 1);
        assert_eq!(shown_text(&store), vec!["Visible"]);
        assert!(store.annotations(1).unwrap().is_empty());
        assert_eq!(store.apply_redactions(1).unwrap(), 0);
    }

    #[test]
    fn test_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let mut store = fixture();
        let rect = Rect::new(10.0, 10.0, 60.0, 40.0);
        store
            .add(1, ShapeKind::Circle { rect }, &ShapeStyle::default())
            .unwrap();
        store.save(&path).unwrap();

        let reopened = LopdfStore::open(&path).unwrap();
        let annots = reopened.annotations(1).unwrap();
        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].kind, ShapeKind::Circle { rect });
        assert_eq!(shown_text(&reopened), vec!["Confidential", "Visible"]);
    }

    #[test]
    fn test_default_appearance_parsing() {
        assert_eq!(
            parse_default_appearance("0 0 1 rg /Helv 14 Tf"),
            (Some(Color::rgb(0.0, 0.0, 1.0)), Some(14))
        );
        assert_eq!(parse_default_appearance("/Helv 0 Tf 0.5 g"), (Some(Color::rgb(0.5, 0.5, 0.5)), None));
        assert_eq!(parse_default_appearance(""), (None, None));
    }
}
