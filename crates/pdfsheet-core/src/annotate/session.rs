//! Editing state for one open PDF.
//!
//! A front-end feeds pointer gestures (`press`, `drag`, `release`) in screen
//! pixels and calls commands directly; the session turns them into
//! annotation edits on the current page of its [`AnnotationStore`].

use std::mem;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::geometry::{is_large_enough, is_real_move, Point, Rect, ViewTransform, Zoom};
use super::shape::{Annotation, Color, ShapeKind, ShapeStyle, Tool, DEFAULT_FONT_SIZE};
use super::store::AnnotationStore;
use super::Xref;
use crate::config::Settings;
use crate::error::PdfsheetError;

/// File name suffix used by [`DocumentSession::save_edited`].
pub const DEFAULT_EDITED_SUFFIX: &str = "_edited";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    SinglePage,
    Continuous,
}

/// What happens to a redaction right after it is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RedactionMode {
    /// Remove the content underneath immediately. Cannot be undone.
    Apply,
    /// Keep it as a redaction annotation to apply later.
    #[default]
    Pending,
}

/// Feedback to draw while a gesture is in progress, in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview {
    Shape { tool: Tool, start: Point, end: Point },
    Move { rect: Rect },
}

/// Result of a press or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Nothing,
    Selected(Option<Xref>),
    MoveStarted(Xref),
    /// The tool places text: ask the user for it, then call
    /// [`DocumentSession::add_sticky_note`] or [`DocumentSession::add_text_box`].
    TextRequested { tool: Tool, at: Point },
    Created(Xref),
    Moved(Xref),
    /// The drag was too small to make a shape.
    Discarded,
}

#[derive(Debug, Clone, Copy)]
enum Gesture {
    Idle,
    Drawing {
        tool: Tool,
        start: Point,
    },
    Moving {
        xref: Xref,
        start: Point,
        original: Rect,
    },
}

struct OpenDocument<S> {
    store: S,
    source: Option<PathBuf>,
}

pub struct DocumentSession<S: AnnotationStore> {
    doc: Option<OpenDocument<S>>,
    page: u32,
    zoom: Zoom,
    view_mode: ViewMode,
    tool: Tool,
    style: ShapeStyle,
    redaction_mode: RedactionMode,
    edited_suffix: String,
    selected: Option<Xref>,
    gesture: Gesture,
    modified: bool,
}

impl<S: AnnotationStore> Default for DocumentSession<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AnnotationStore> DocumentSession<S> {
    pub fn new() -> Self {
        Self {
            doc: None,
            page: 1,
            zoom: Zoom::default(),
            view_mode: ViewMode::default(),
            tool: Tool::default(),
            style: ShapeStyle::default(),
            redaction_mode: RedactionMode::default(),
            edited_suffix: DEFAULT_EDITED_SUFFIX.to_string(),
            selected: None,
            gesture: Gesture::Idle,
            modified: false,
        }
    }

    pub fn with_settings(settings: &Settings) -> Self {
        let mut session = Self::new();
        session.apply_settings(settings);
        session
    }

    /// Take tool defaults, zoom and save suffix from settings.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.style = settings.tool.style();
        self.zoom = Zoom::from_percent(settings.zoom_percent);
        self.edited_suffix = settings.edited_suffix.clone();
    }

    /// Open a document, dropping the previous one and any unsaved edits.
    pub fn load(&mut self, store: S, source: Option<PathBuf>) {
        if self.modified {
            tracing::warn!("discarding unsaved changes of the previous document");
        }
        tracing::debug!(pages = store.page_count(), "document loaded");
        self.doc = Some(OpenDocument { store, source });
        self.page = 1;
        self.selected = None;
        self.gesture = Gesture::Idle;
        self.modified = false;
    }

    pub fn is_open(&self) -> bool {
        self.doc.is_some()
    }

    pub fn store(&self) -> Option<&S> {
        self.doc.as_ref().map(|d| &d.store)
    }

    pub fn source(&self) -> Option<&Path> {
        self.doc.as_ref().and_then(|d| d.source.as_deref())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        self.store().map_or(0, AnnotationStore::page_count)
    }

    pub fn selected(&self) -> Option<Xref> {
        self.selected
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switching tools abandons any gesture in progress.
    pub fn set_tool(&mut self, tool: Tool) {
        self.tool = tool;
        self.gesture = Gesture::Idle;
    }

    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    pub fn set_style(&mut self, style: ShapeStyle) {
        self.style = style;
    }

    pub fn set_redaction_mode(&mut self, mode: RedactionMode) {
        self.redaction_mode = mode;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    fn open(&self) -> Result<&OpenDocument<S>, PdfsheetError> {
        self.doc.as_ref().ok_or(PdfsheetError::NoDocument)
    }

    fn open_mut(&mut self) -> Result<&mut OpenDocument<S>, PdfsheetError> {
        self.doc.as_mut().ok_or(PdfsheetError::NoDocument)
    }

    // Zoom

    pub fn zoom(&self) -> Zoom {
        self.zoom
    }

    pub fn view(&self) -> ViewTransform {
        ViewTransform::new(self.zoom)
    }

    pub fn set_zoom(&mut self, zoom: Zoom) {
        self.zoom = zoom;
    }

    pub fn set_zoom_percent(&mut self, percent: u32) {
        self.zoom = Zoom::from_percent(percent);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom = self.zoom.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom = Zoom::reset();
    }

    // Navigation

    pub fn go_to_page(&mut self, page: u32) -> Result<(), PdfsheetError> {
        let count = self.open()?.store.page_count();
        if page == 0 || page > count {
            return Err(PdfsheetError::PageOutOfRange { page, count });
        }
        self.page = page;
        self.selected = None;
        self.gesture = Gesture::Idle;
        Ok(())
    }

    /// Returns false when already on the last page or nothing is open.
    pub fn next_page(&mut self) -> bool {
        self.page < self.page_count() && self.go_to_page(self.page + 1).is_ok()
    }

    pub fn prev_page(&mut self) -> bool {
        self.page > 1 && self.go_to_page(self.page - 1).is_ok()
    }

    pub fn first_page(&mut self) -> bool {
        self.go_to_page(1).is_ok()
    }

    pub fn last_page(&mut self) -> bool {
        let count = self.page_count();
        self.go_to_page(count).is_ok()
    }

    /// Jump to a page typed by the user. Anything that is not a valid page
    /// number is ignored.
    pub fn enter_page_number(&mut self, input: &str) -> bool {
        match input.trim().parse::<u32>() {
            Ok(page) => self.go_to_page(page).is_ok(),
            Err(_) => false,
        }
    }

    // Selection

    /// Annotations of the current page, in hit-test order.
    pub fn annotations(&self) -> Result<Vec<Annotation>, PdfsheetError> {
        self.open()?.store.annotations(self.page)
    }

    fn find(&self, xref: Xref) -> Result<Annotation, PdfsheetError> {
        self.annotations()?
            .into_iter()
            .find(|a| a.xref == xref)
            .ok_or(PdfsheetError::AnnotationNotFound(xref))
    }

    pub fn selected_annotation(&self) -> Result<Option<Annotation>, PdfsheetError> {
        self.selected.map(|xref| self.find(xref)).transpose()
    }

    /// Select the first annotation under a document-space point, or clear
    /// the selection when there is none.
    pub fn select_at(&mut self, at: Point) -> Result<Option<Xref>, PdfsheetError> {
        let annots = self.annotations()?;
        self.selected = super::geometry::hit_test(&annots, at).map(|a| a.xref);
        Ok(self.selected)
    }

    pub fn select_xref(&mut self, xref: Xref) -> Result<(), PdfsheetError> {
        self.find(xref)?;
        self.selected = Some(xref);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // Editing

    /// Add a shape to the current page with the active style.
    pub fn create_shape(&mut self, kind: ShapeKind) -> Result<Xref, PdfsheetError> {
        let page = self.page;
        let style = self.style.clone();
        let xref = self.open_mut()?.store.add(page, kind, &style)?;
        self.modified = true;
        Ok(xref)
    }

    /// Place a sticky note. Empty text adds nothing.
    pub fn add_sticky_note(&mut self, at: Point, text: &str) -> Result<Option<Xref>, PdfsheetError> {
        if text.is_empty() {
            return Ok(None);
        }
        self.create_shape(ShapeKind::StickyNote {
            point: at,
            text: text.to_string(),
        })
        .map(Some)
    }

    /// Place a text box sized to its text. Empty text adds nothing.
    ///
    /// Without a fill colour the box gets a white background.
    pub fn add_text_box(
        &mut self,
        at: Point,
        text: &str,
        font_size: Option<u32>,
    ) -> Result<Option<Xref>, PdfsheetError> {
        if text.is_empty() {
            return Ok(None);
        }
        let kind = ShapeKind::free_text(at, text, font_size.unwrap_or(DEFAULT_FONT_SIZE));
        let page = self.page;
        let style = ShapeStyle {
            fill: Some(self.style.fill.unwrap_or(Color::WHITE)),
            ..self.style.clone()
        };
        let xref = self.open_mut()?.store.add(page, kind, &style)?;
        self.modified = true;
        Ok(Some(xref))
    }

    /// Mark an area for redaction, applying it straight away in
    /// [`RedactionMode::Apply`].
    pub fn add_redaction(&mut self, rect: Rect, mode: RedactionMode) -> Result<Xref, PdfsheetError> {
        let xref = self.create_shape(ShapeKind::Redaction { rect })?;
        if mode == RedactionMode::Apply {
            self.apply_redactions()?;
        }
        Ok(xref)
    }

    /// Apply every pending redaction of the current page.
    pub fn apply_redactions(&mut self) -> Result<usize, PdfsheetError> {
        let page = self.page;
        let applied = self.open_mut()?.store.apply_redactions(page)?;
        if applied > 0 {
            self.modified = true;
            if self
                .selected
                .is_some_and(|x| self.find(x).is_err())
            {
                self.selected = None;
            }
        }
        Ok(applied)
    }

    /// Move the selected annotation by a document-space delta.
    ///
    /// Returns false, changing nothing, when the delta is below one unit on
    /// both axes.
    pub fn move_selected(&mut self, dx: f64, dy: f64) -> Result<bool, PdfsheetError> {
        let xref = self.selected.ok_or(PdfsheetError::NoSelection)?;
        if !is_real_move(dx, dy) {
            return Ok(false);
        }
        let moved = self.find(xref)?.kind.translated(dx, dy);
        let page = self.page;
        self.open_mut()?.store.update(page, xref, &moved)?;
        self.modified = true;
        tracing::debug!(%xref, dx, dy, "annotation moved");
        Ok(true)
    }

    pub fn delete_selected(&mut self) -> Result<Xref, PdfsheetError> {
        let xref = self.selected.ok_or(PdfsheetError::NoSelection)?;
        let page = self.page;
        self.open_mut()?.store.delete(page, xref)?;
        self.selected = None;
        self.modified = true;
        Ok(xref)
    }

    /// Delete every annotation on the current page. Returns how many went.
    pub fn delete_all_on_page(&mut self) -> Result<usize, PdfsheetError> {
        let page = self.page;
        let annots = self.annotations()?;
        let store = &mut self.open_mut()?.store;
        for annot in &annots {
            store.delete(page, annot.xref)?;
        }
        self.selected = None;
        if !annots.is_empty() {
            self.modified = true;
        }
        Ok(annots.len())
    }

    // Gestures

    /// Pointer pressed at a screen position.
    pub fn press(&mut self, at: Point) -> Result<GestureOutcome, PdfsheetError> {
        if !self.is_open() {
            return Ok(GestureOutcome::Nothing);
        }
        let doc_point = self.view().screen_to_doc(at);

        match self.tool {
            Tool::Select => {
                if let Some(annot) = self.selected_annotation()? {
                    let rect = annot.bounding_rect();
                    if rect.contains(doc_point) {
                        self.gesture = Gesture::Moving {
                            xref: annot.xref,
                            start: at,
                            original: rect,
                        };
                        return Ok(GestureOutcome::MoveStarted(annot.xref));
                    }
                }
                Ok(GestureOutcome::Selected(self.select_at(doc_point)?))
            }
            tool if tool.needs_text() => Ok(GestureOutcome::TextRequested { tool, at: doc_point }),
            tool => {
                self.gesture = Gesture::Drawing { tool, start: at };
                Ok(GestureOutcome::Nothing)
            }
        }
    }

    /// Pointer dragged to a screen position while pressed.
    pub fn drag(&mut self, to: Point) -> Option<Preview> {
        match self.gesture {
            Gesture::Idle => None,
            Gesture::Drawing { tool, start } => Some(Preview::Shape {
                tool,
                start,
                end: to,
            }),
            Gesture::Moving {
                start, original, ..
            } => Some(Preview::Move {
                rect: self
                    .view()
                    .rect_to_screen(&original)
                    .translate(to.x - start.x, to.y - start.y),
            }),
        }
    }

    /// Pointer released at a screen position, finishing the gesture.
    pub fn release(&mut self, at: Point) -> Result<GestureOutcome, PdfsheetError> {
        match mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => Ok(GestureOutcome::Nothing),
            Gesture::Moving { xref, start, .. } => {
                let (dx, dy) = self.view().delta_to_doc(at.x - start.x, at.y - start.y);
                self.selected = Some(xref);
                if self.move_selected(dx, dy)? {
                    Ok(GestureOutcome::Moved(xref))
                } else {
                    Ok(GestureOutcome::Nothing)
                }
            }
            Gesture::Drawing { tool, start } => {
                if !is_large_enough(start, at) {
                    return Ok(GestureOutcome::Discarded);
                }
                let view = self.view();
                let (a, b) = (view.screen_to_doc(start), view.screen_to_doc(at));
                let rect = Rect::from_corners(a, b);
                let xref = match tool {
                    Tool::Line => self.create_shape(ShapeKind::Line { start: a, end: b })?,
                    Tool::Rectangle => self.create_shape(ShapeKind::Rectangle { rect })?,
                    Tool::Circle => self.create_shape(ShapeKind::Circle { rect })?,
                    Tool::Highlight => self.create_shape(ShapeKind::Highlight { rect })?,
                    Tool::Redact => self.add_redaction(rect, self.redaction_mode)?,
                    Tool::Select | Tool::Note | Tool::Text => return Ok(GestureOutcome::Nothing),
                };
                Ok(GestureOutcome::Created(xref))
            }
        }
    }

    pub fn cancel_gesture(&mut self) {
        self.gesture = Gesture::Idle;
    }

    // Saving

    pub fn save(&mut self, path: &Path) -> Result<(), PdfsheetError> {
        self.open_mut()?.store.save(path)?;
        self.modified = false;
        Ok(())
    }

    /// Save next to the source as `<stem><suffix>.pdf`.
    pub fn save_edited(&mut self) -> Result<PathBuf, PdfsheetError> {
        let path = edited_path(self.open()?.source.as_deref(), &self.edited_suffix);
        self.save(&path)?;
        Ok(path)
    }
}

/// `report.pdf` becomes `report_edited.pdf` for suffix `_edited`.
pub fn edited_path(source: Option<&Path>, suffix: &str) -> PathBuf {
    let Some(source) = source else {
        return PathBuf::from("edited.pdf");
    };
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    source.with_file_name(format!("{stem}{suffix}.pdf"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::store::MemoryStore;

    fn session(pages: u32) -> DocumentSession<MemoryStore> {
        let mut s = DocumentSession::new();
        s.load(MemoryStore::letter(pages), Some(PathBuf::from("/tmp/report.pdf")));
        s
    }

    fn drag_shape(s: &mut DocumentSession<MemoryStore>, from: Point, to: Point) -> GestureOutcome {
        s.press(from).unwrap();
        s.drag(to);
        s.release(to).unwrap()
    }

    #[test]
    fn test_small_drag_creates_nothing() {
        let mut s = session(1);
        s.set_tool(Tool::Rectangle);
        let out = drag_shape(&mut s, Point::new(100.0, 100.0), Point::new(104.0, 96.0));
        assert_eq!(out, GestureOutcome::Discarded);
        assert!(s.annotations().unwrap().is_empty());
        assert!(!s.is_modified());
    }

    #[test]
    fn test_drag_creates_shape_in_document_units() {
        let mut s = session(1);
        s.set_tool(Tool::Rectangle);
        let out = drag_shape(&mut s, Point::new(150.0, 300.0), Point::new(30.0, 150.0));
        assert!(matches!(out, GestureOutcome::Created(_)));
        let annots = s.annotations().unwrap();
        assert_eq!(
            annots[0].kind,
            ShapeKind::Rectangle {
                rect: Rect::new(20.0, 100.0, 100.0, 200.0)
            }
        );
        assert!(s.is_modified());
    }

    #[test]
    fn test_drag_preview_follows_pointer() {
        let mut s = session(1);
        s.set_tool(Tool::Line);
        s.press(Point::new(0.0, 0.0)).unwrap();
        assert_eq!(
            s.drag(Point::new(40.0, 10.0)),
            Some(Preview::Shape {
                tool: Tool::Line,
                start: Point::new(0.0, 0.0),
                end: Point::new(40.0, 10.0),
            })
        );
    }

    #[test]
    fn test_move_by_twenty_screen_pixels() {
        let mut s = session(1);
        let rect = Rect::new(100.0, 100.0, 200.0, 150.0);
        let xref = s.create_shape(ShapeKind::Rectangle { rect }).unwrap();
        s.select_xref(xref).unwrap();

        // Press inside the selected rectangle (doc 120,120 -> screen 180,180).
        let out = s.press(Point::new(180.0, 180.0)).unwrap();
        assert_eq!(out, GestureOutcome::MoveStarted(xref));
        let preview = s.drag(Point::new(200.0, 200.0));
        assert_eq!(
            preview,
            Some(Preview::Move {
                rect: Rect::new(170.0, 170.0, 320.0, 245.0)
            })
        );
        assert_eq!(s.release(Point::new(200.0, 200.0)).unwrap(), GestureOutcome::Moved(xref));

        let ShapeKind::Rectangle { rect: moved } = s.annotations().unwrap()[0].kind else {
            panic!("expected rectangle");
        };
        assert!((moved.x0 - 113.333).abs() < 1e-3);
        assert!((moved.y0 - 113.333).abs() < 1e-3);
        assert!((moved.width() - 100.0).abs() < 1e-9);
        assert_eq!(s.selected(), Some(xref));
    }

    #[test]
    fn test_tiny_move_is_ignored() {
        let mut s = session(1);
        let rect = Rect::new(0.0, 0.0, 50.0, 50.0);
        let xref = s.create_shape(ShapeKind::Rectangle { rect }).unwrap();
        s.select_xref(xref).unwrap();
        assert!(!s.move_selected(0.5, -0.9).unwrap());
        assert_eq!(s.annotations().unwrap()[0].kind, ShapeKind::Rectangle { rect });
    }

    #[test]
    fn test_press_outside_selection_reselects() {
        let mut s = session(1);
        let a = s
            .create_shape(ShapeKind::Rectangle {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            })
            .unwrap();
        let b = s
            .create_shape(ShapeKind::Circle {
                rect: Rect::new(100.0, 100.0, 120.0, 120.0),
            })
            .unwrap();
        s.select_xref(a).unwrap();
        let out = s.press(Point::new(165.0, 165.0)).unwrap();
        assert_eq!(out, GestureOutcome::Selected(Some(b)));
        let out = s.press(Point::new(600.0, 600.0)).unwrap();
        assert_eq!(out, GestureOutcome::Selected(None));
        assert_eq!(s.release(Point::new(600.0, 600.0)).unwrap(), GestureOutcome::Nothing);
    }

    #[test]
    fn test_text_tools_request_text() {
        let mut s = session(1);
        s.set_tool(Tool::Text);
        let out = s.press(Point::new(15.0, 30.0)).unwrap();
        let GestureOutcome::TextRequested { tool, at } = out else {
            panic!("expected text request");
        };
        assert_eq!(tool, Tool::Text);
        assert_eq!(at, Point::new(10.0, 20.0));

        assert_eq!(s.add_text_box(at, "", None).unwrap(), None);
        s.add_text_box(at, "Hi", Some(100)).unwrap().unwrap();
        let annot = &s.annotations().unwrap()[0];
        assert!(matches!(annot.kind, ShapeKind::FreeText { font_size: 72, .. }));
        assert_eq!(annot.style.fill, Some(Color::WHITE));
    }

    #[test]
    fn test_navigation_clears_selection() {
        let mut s = session(3);
        let xref = s
            .create_shape(ShapeKind::Rectangle {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            })
            .unwrap();
        s.select_xref(xref).unwrap();
        assert!(s.next_page());
        assert_eq!(s.page(), 2);
        assert_eq!(s.selected(), None);

        assert!(s.last_page());
        assert!(!s.next_page());
        assert_eq!(s.page(), 3);
        assert!(s.prev_page());
        assert!(s.first_page());
        assert!(!s.prev_page());

        assert!(!s.enter_page_number("abc"));
        assert!(!s.enter_page_number("9"));
        assert!(!s.enter_page_number(""));
        assert_eq!(s.page(), 1);
        assert!(s.enter_page_number(" 3 "));
        assert_eq!(s.page(), 3);
        assert!(matches!(
            s.go_to_page(4),
            Err(PdfsheetError::PageOutOfRange { page: 4, count: 3 })
        ));
    }

    #[test]
    fn test_delete_commands() {
        let mut s = session(1);
        assert!(matches!(s.delete_selected(), Err(PdfsheetError::NoSelection)));
        for x in [0.0, 50.0, 100.0] {
            s.create_shape(ShapeKind::Rectangle {
                rect: Rect::new(x, 0.0, x + 10.0, 10.0),
            })
            .unwrap();
        }
        let first = s.annotations().unwrap()[0].xref;
        s.select_xref(first).unwrap();
        assert_eq!(s.delete_selected().unwrap(), first);
        assert_eq!(s.delete_all_on_page().unwrap(), 2);
        assert!(s.annotations().unwrap().is_empty());
    }

    #[test]
    fn test_redaction_modes() {
        let mut s = session(1);
        let rect = Rect::new(10.0, 10.0, 60.0, 30.0);
        s.add_redaction(rect, RedactionMode::Pending).unwrap();
        assert_eq!(s.annotations().unwrap().len(), 1);

        s.add_redaction(rect.translate(0.0, 100.0), RedactionMode::Apply)
            .unwrap();
        assert!(s.annotations().unwrap().is_empty());
        assert_eq!(s.store().unwrap().redacted_regions(1).len(), 2);
    }

    #[test]
    fn test_redact_tool_uses_session_mode() {
        let mut s = session(1);
        s.set_tool(Tool::Redact);
        s.set_redaction_mode(RedactionMode::Apply);
        let out = drag_shape(&mut s, Point::new(0.0, 0.0), Point::new(60.0, 30.0));
        assert!(matches!(out, GestureOutcome::Created(_)));
        assert_eq!(
            s.store().unwrap().redacted_regions(1),
            &[Rect::new(0.0, 0.0, 40.0, 20.0)]
        );
    }

    #[test]
    fn test_no_document() {
        let mut s: DocumentSession<MemoryStore> = DocumentSession::new();
        assert!(matches!(s.annotations(), Err(PdfsheetError::NoDocument)));
        assert_eq!(s.press(Point::new(1.0, 1.0)).unwrap(), GestureOutcome::Nothing);
        assert!(!s.next_page());
        assert!(matches!(s.save_edited(), Err(PdfsheetError::NoDocument)));
    }

    #[test]
    fn test_load_resets_state() {
        let mut s = session(2);
        s.create_shape(ShapeKind::Rectangle {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        })
        .unwrap();
        s.next_page();
        s.load(MemoryStore::letter(1), None);
        assert_eq!(s.page(), 1);
        assert!(!s.is_modified());
        assert!(s.annotations().unwrap().is_empty());
    }

    #[test]
    fn test_zoom_commands_and_settings() {
        let mut s = session(1);
        s.zoom_in();
        s.zoom_in();
        assert_eq!(s.zoom().percent(), 120);
        s.reset_zoom();
        s.zoom_out();
        assert_eq!(s.zoom().percent(), 90);
        s.set_zoom_percent(500);
        assert_eq!(s.zoom().percent(), 300);

        let settings = Settings {
            zoom_percent: 150,
            edited_suffix: "_marked".into(),
            ..Settings::default()
        };
        s.apply_settings(&settings);
        assert_eq!(s.zoom().percent(), 150);
        assert_eq!(s.view().scale(), 2.25);
    }

    #[test]
    fn test_edited_path() {
        assert_eq!(
            edited_path(Some(Path::new("/docs/report.pdf")), "_edited"),
            PathBuf::from("/docs/report_edited.pdf")
        );
        assert_eq!(
            edited_path(Some(Path::new("scan.PDF")), "-v2"),
            PathBuf::from("scan-v2.pdf")
        );
        assert_eq!(edited_path(None, "_edited"), PathBuf::from("edited.pdf"));
    }

    #[test]
    fn test_save_edited_clears_modified_flag() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = DocumentSession::new();
        s.load(MemoryStore::letter(1), Some(dir.path().join("a.pdf")));
        s.create_shape(ShapeKind::Rectangle {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        })
        .unwrap();
        let path = s.save_edited().unwrap();
        assert_eq!(path, dir.path().join("a_edited.pdf"));
        assert!(path.exists());
        assert!(!s.is_modified());
    }
}
