//! Conversions between screen pixels and document units.
//!
//! Document space is the page in PDF points with the origin at the top-left
//! corner and y growing downwards. Screen space is the same page rendered at
//! `zoom * BASE_SCALE` pixels per point.

use serde::{Deserialize, Serialize};

use super::shape::Annotation;

/// Pixels per document unit at 100% zoom.
pub const BASE_SCALE: f64 = 1.5;

/// Drags shorter than this on both axes (screen px) create nothing.
pub const MIN_DRAG_PX: f64 = 5.0;

/// Moves shorter than this on both axes (document units) are ignored.
pub const MIN_MOVE_UNITS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned rectangle with `x0 <= x1` and `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self::from_corners(Point::new(x0, y0), Point::new(x1, y1))
    }

    /// Rectangle spanned by two opposite corners given in any order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Edges count as inside.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x0 && p.x <= self.x1 && p.y >= self.y0 && p.y <= self.y1
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.y0 <= other.y1 && other.y0 <= self.y1
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x0: self.x0 + dx,
            y0: self.y0 + dy,
            x1: self.x1 + dx,
            y1: self.y1 + dy,
        }
    }

    pub fn inflate(&self, by: f64) -> Self {
        Self {
            x0: self.x0 - by,
            y0: self.y0 - by,
            x1: self.x1 + by,
            y1: self.y1 + by,
        }
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x0, self.y0)
    }
}

/// Zoom factor, always within `[Zoom::MIN, Zoom::MAX]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Zoom(f64);

impl Zoom {
    pub const MIN: f64 = 0.5;
    pub const MAX: f64 = 3.0;
    pub const STEP: f64 = 0.1;
    /// Percentages offered as one-click choices.
    pub const PRESETS: [u32; 6] = [50, 75, 100, 125, 150, 200];

    pub fn new(level: f64) -> Self {
        if level.is_nan() {
            return Self::default();
        }
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn from_percent(percent: u32) -> Self {
        Self::new(f64::from(percent) / 100.0)
    }

    pub fn level(self) -> f64 {
        self.0
    }

    pub fn percent(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }

    pub fn zoom_in(self) -> Self {
        Self::new(round_step(self.0 + Self::STEP))
    }

    pub fn zoom_out(self) -> Self {
        Self::new(round_step(self.0 - Self::STEP))
    }

    pub fn reset() -> Self {
        Self::default()
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self(1.0)
    }
}

impl TryFrom<f64> for Zoom {
    type Error = String;

    fn try_from(level: f64) -> Result<Self, Self::Error> {
        if (Self::MIN..=Self::MAX).contains(&level) {
            Ok(Self(level))
        } else {
            Err(format!("zoom {level} outside {}..={}", Self::MIN, Self::MAX))
        }
    }
}

impl From<Zoom> for f64 {
    fn from(zoom: Zoom) -> f64 {
        zoom.0
    }
}

// Repeated 0.1 steps drift in binary floating point; keep two decimals.
fn round_step(level: f64) -> f64 {
    (level * 100.0).round() / 100.0
}

/// Maps between screen pixels and document units for one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewTransform {
    pub zoom: Zoom,
}

impl ViewTransform {
    pub fn new(zoom: Zoom) -> Self {
        Self { zoom }
    }

    pub fn scale(&self) -> f64 {
        self.zoom.level() * BASE_SCALE
    }

    pub fn screen_to_doc(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x / s, p.y / s)
    }

    pub fn doc_to_screen(&self, p: Point) -> Point {
        let s = self.scale();
        Point::new(p.x * s, p.y * s)
    }

    pub fn rect_to_screen(&self, r: &Rect) -> Rect {
        Rect::from_corners(
            self.doc_to_screen(r.top_left()),
            self.doc_to_screen(Point::new(r.x1, r.y1)),
        )
    }

    pub fn rect_to_doc(&self, r: &Rect) -> Rect {
        Rect::from_corners(
            self.screen_to_doc(r.top_left()),
            self.screen_to_doc(Point::new(r.x1, r.y1)),
        )
    }

    /// Screen-pixel delta expressed in document units.
    pub fn delta_to_doc(&self, dx: f64, dy: f64) -> (f64, f64) {
        let s = self.scale();
        (dx / s, dy / s)
    }
}

/// Whether a drag between two screen points is big enough to make a shape.
pub fn is_large_enough(start: Point, end: Point) -> bool {
    (end.x - start.x).abs() >= MIN_DRAG_PX || (end.y - start.y).abs() >= MIN_DRAG_PX
}

/// Whether a document-space delta is big enough to count as a move.
pub fn is_real_move(dx: f64, dy: f64) -> bool {
    dx.abs() >= MIN_MOVE_UNITS || dy.abs() >= MIN_MOVE_UNITS
}

/// First annotation, in stored order, whose bounds contain `p`.
pub fn hit_test(annotations: &[Annotation], p: Point) -> Option<&Annotation> {
    annotations.iter().find(|a| a.bounding_rect().contains(p))
}
