//! PDF annotation editing: view geometry, shapes, the edit session and the
//! stores that hold a document's annotations.

pub mod geometry;
pub mod lopdf_store;
mod redact;
pub mod session;
pub mod shape;
pub mod store;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use geometry::{Point, Rect, ViewTransform, Zoom};
pub use lopdf_store::LopdfStore;
pub use session::{DocumentSession, GestureOutcome, Preview, RedactionMode, ViewMode};
pub use shape::{Annotation, Color, ShapeKind, ShapeStyle, Tool};
pub use store::{AnnotationStore, MemoryStore};

/// Document-scoped identifier of an annotation.
///
/// For PDF files this is the object number of the annotation dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Xref(pub u32);

impl fmt::Display for Xref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
