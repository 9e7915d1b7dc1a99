use std::collections::BTreeMap;
use std::path::Path;

use super::geometry::Rect;
use super::shape::{Annotation, ShapeKind, ShapeStyle};
use super::Xref;
use crate::error::PdfsheetError;

/// An open document whose annotations can be read and edited.
///
/// Pages are 1-based. Annotations of a page are listed in a stable order,
/// which is also the order used for hit-testing.
pub trait AnnotationStore {
    fn page_count(&self) -> u32;

    /// Page width and height in document units.
    fn page_size(&self, page: u32) -> Result<(f64, f64), PdfsheetError>;

    fn annotations(&self, page: u32) -> Result<Vec<Annotation>, PdfsheetError>;

    fn add(
        &mut self,
        page: u32,
        kind: ShapeKind,
        style: &ShapeStyle,
    ) -> Result<Xref, PdfsheetError>;

    /// Replace the geometry of an existing annotation.
    fn update(&mut self, page: u32, xref: Xref, kind: &ShapeKind) -> Result<(), PdfsheetError>;

    fn delete(&mut self, page: u32, xref: Xref) -> Result<(), PdfsheetError>;

    /// Permanently remove content under every redaction of the page.
    /// Returns how many redactions were applied.
    fn apply_redactions(&mut self, page: u32) -> Result<usize, PdfsheetError>;

    fn save(&mut self, path: &Path) -> Result<(), PdfsheetError>;
}

pub(crate) fn check_page(page: u32, count: u32) -> Result<(), PdfsheetError> {
    if page == 0 || page > count {
        return Err(PdfsheetError::PageOutOfRange { page, count });
    }
    Ok(())
}

/// Annotations kept in memory, for documents without a backing file.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    page_sizes: Vec<(f64, f64)>,
    pages: BTreeMap<u32, Vec<Annotation>>,
    /// Regions whose content has been redacted, per page.
    redacted: BTreeMap<u32, Vec<Rect>>,
    next_xref: u32,
}

impl MemoryStore {
    pub fn new(page_sizes: Vec<(f64, f64)>) -> Self {
        Self {
            page_sizes,
            pages: BTreeMap::new(),
            redacted: BTreeMap::new(),
            next_xref: 1,
        }
    }

    /// `count` US Letter pages.
    pub fn letter(count: u32) -> Self {
        Self::new(vec![(612.0, 792.0); count as usize])
    }

    pub fn redacted_regions(&self, page: u32) -> &[Rect] {
        self.redacted.get(&page).map(Vec::as_slice).unwrap_or(&[])
    }

    fn page_mut(&mut self, page: u32) -> Result<&mut Vec<Annotation>, PdfsheetError> {
        check_page(page, self.page_count())?;
        Ok(self.pages.entry(page).or_default())
    }
}

impl AnnotationStore for MemoryStore {
    fn page_count(&self) -> u32 {
        self.page_sizes.len() as u32
    }

    fn page_size(&self, page: u32) -> Result<(f64, f64), PdfsheetError> {
        check_page(page, self.page_count())?;
        Ok(self.page_sizes[page as usize - 1])
    }

    fn annotations(&self, page: u32) -> Result<Vec<Annotation>, PdfsheetError> {
        check_page(page, self.page_count())?;
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }

    fn add(
        &mut self,
        page: u32,
        kind: ShapeKind,
        style: &ShapeStyle,
    ) -> Result<Xref, PdfsheetError> {
        let xref = Xref(self.next_xref);
        self.page_mut(page)?.push(Annotation {
            xref,
            kind,
            style: style.clone(),
            contents: None,
        });
        self.next_xref += 1;
        Ok(xref)
    }

    fn update(&mut self, page: u32, xref: Xref, kind: &ShapeKind) -> Result<(), PdfsheetError> {
        let annot = self
            .page_mut(page)?
            .iter_mut()
            .find(|a| a.xref == xref)
            .ok_or(PdfsheetError::AnnotationNotFound(xref))?;
        annot.kind = kind.clone();
        Ok(())
    }

    fn delete(&mut self, page: u32, xref: Xref) -> Result<(), PdfsheetError> {
        let annots = self.page_mut(page)?;
        let pos = annots
            .iter()
            .position(|a| a.xref == xref)
            .ok_or(PdfsheetError::AnnotationNotFound(xref))?;
        annots.remove(pos);
        Ok(())
    }

    fn apply_redactions(&mut self, page: u32) -> Result<usize, PdfsheetError> {
        let annots = self.page_mut(page)?;
        let mut regions = Vec::new();
        annots.retain(|a| match a.kind {
            ShapeKind::Redaction { rect } => {
                regions.push(rect);
                false
            }
            _ => true,
        });
        let applied = regions.len();
        self.redacted.entry(page).or_default().extend(regions);
        Ok(applied)
    }

    fn save(&mut self, path: &Path) -> Result<(), PdfsheetError> {
        let json = serde_json::to_string_pretty(&self.pages)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::geometry::Point;

    #[test]
    fn test_add_update_delete() {
        let mut store = MemoryStore::letter(2);
        let style = ShapeStyle::default();
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let a = store.add(1, ShapeKind::Rectangle { rect }, &style).unwrap();
        let b = store
            .add(
                1,
                ShapeKind::StickyNote {
                    point: Point::new(5.0, 5.0),
                    text: "hi".into(),
                },
                &style,
            )
            .unwrap();
        assert_ne!(a, b);

        let moved = ShapeKind::Rectangle {
            rect: rect.translate(3.0, 3.0),
        };
        store.update(1, a, &moved).unwrap();
        assert_eq!(store.annotations(1).unwrap()[0].kind, moved);

        store.delete(1, a).unwrap();
        let left = store.annotations(1).unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].xref, b);
        assert!(matches!(
            store.delete(1, a),
            Err(PdfsheetError::AnnotationNotFound(x)) if x == a
        ));
    }

    #[test]
    fn test_page_bounds() {
        let store = MemoryStore::letter(1);
        assert!(matches!(
            store.annotations(2),
            Err(PdfsheetError::PageOutOfRange { page: 2, count: 1 })
        ));
        assert!(store.annotations(0).is_err());
    }

    #[test]
    fn test_apply_redactions_consumes_redaction_annotations() {
        let mut store = MemoryStore::letter(1);
        let rect = Rect::new(10.0, 10.0, 50.0, 20.0);
        store
            .add(1, ShapeKind::Redaction { rect }, &ShapeStyle::default())
            .unwrap();
        assert_eq!(store.apply_redactions(1).unwrap(), 1);
        assert!(store.annotations(1).unwrap().is_empty());
        assert_eq!(store.redacted_regions(1), &[rect]);
    }
}
