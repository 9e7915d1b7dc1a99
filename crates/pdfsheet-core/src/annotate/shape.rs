use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect};
use super::Xref;

pub const DEFAULT_FONT_SIZE: u32 = 12;
pub const MIN_FONT_SIZE: u32 = 6;
pub const MAX_FONT_SIZE: u32 = 72;

/// Side length of the icon drawn for a sticky note, in document units.
pub const NOTE_ICON_SIZE: f64 = 20.0;

/// RGB colour with channels in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
    pub const RED: Color = Color::rgb(1.0, 0.0, 0.0);
    pub const YELLOW: Color = Color::rgb(1.0, 1.0, 0.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub fn channels(&self) -> [f64; 3] {
        [self.r, self.g, self.b]
    }

    pub fn is_valid(&self) -> bool {
        self.channels().iter().all(|c| (0.0..=1.0).contains(c))
    }

    pub fn to_hex(&self) -> String {
        let byte = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

impl FromStr for Color {
    type Err = String;

    /// Parses `#rrggbb` (the `#` is optional).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("invalid colour '{s}', expected #rrggbb"));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map(|v| f64::from(v) / 255.0)
                .map_err(|_| format!("invalid colour '{s}', expected #rrggbb"))
        };
        Ok(Color::rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// How a shape is stroked and filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeStyle {
    pub color: Color,
    /// Interior colour; `None` leaves the shape unfilled.
    #[serde(default)]
    pub fill: Option<Color>,
    pub opacity: f64,
    pub width: u32,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            color: Color::RED,
            fill: None,
            opacity: 1.0,
            width: 2,
        }
    }
}

/// Geometry and payload of an annotation, in document space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Line { start: Point, end: Point },
    Rectangle { rect: Rect },
    Circle { rect: Rect },
    /// Highlighted region, written to the file as a single quad.
    Highlight { rect: Rect },
    FreeText { rect: Rect, text: String, font_size: u32 },
    StickyNote { point: Point, text: String },
    Redaction { rect: Rect },
    /// Annotation types this crate reads but never creates.
    Other { subtype: String, rect: Rect },
}

impl ShapeKind {
    /// Text box sized to fit `text` at `font_size`, anchored at `at`.
    ///
    /// Font size is clamped to 6..=72.
    pub fn free_text(at: Point, text: impl Into<String>, font_size: u32) -> Self {
        let text = text.into();
        let font_size = font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        let fs = f64::from(font_size);
        let width = text.chars().count() as f64 * fs * 0.6 + 20.0;
        let height = fs + 10.0;
        ShapeKind::FreeText {
            rect: Rect::new(at.x, at.y, at.x + width, at.y + height),
            text,
            font_size,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            ShapeKind::Line { .. } => "Line",
            ShapeKind::Rectangle { .. } => "Rectangle",
            ShapeKind::Circle { .. } => "Circle",
            ShapeKind::Highlight { .. } => "Highlight",
            ShapeKind::FreeText { .. } => "Text box",
            ShapeKind::StickyNote { .. } => "Note",
            ShapeKind::Redaction { .. } => "Redaction",
            ShapeKind::Other { subtype, .. } => subtype,
        }
    }

    /// The same shape shifted by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        match self {
            ShapeKind::Line { start, end } => ShapeKind::Line {
                start: start.translate(dx, dy),
                end: end.translate(dx, dy),
            },
            ShapeKind::Rectangle { rect } => ShapeKind::Rectangle {
                rect: rect.translate(dx, dy),
            },
            ShapeKind::Circle { rect } => ShapeKind::Circle {
                rect: rect.translate(dx, dy),
            },
            ShapeKind::Highlight { rect } => ShapeKind::Highlight {
                rect: rect.translate(dx, dy),
            },
            ShapeKind::FreeText {
                rect,
                text,
                font_size,
            } => ShapeKind::FreeText {
                rect: rect.translate(dx, dy),
                text: text.clone(),
                font_size: *font_size,
            },
            ShapeKind::StickyNote { point, text } => ShapeKind::StickyNote {
                point: point.translate(dx, dy),
                text: text.clone(),
            },
            ShapeKind::Redaction { rect } => ShapeKind::Redaction {
                rect: rect.translate(dx, dy),
            },
            ShapeKind::Other { subtype, rect } => ShapeKind::Other {
                subtype: subtype.clone(),
                rect: rect.translate(dx, dy),
            },
        }
    }
}

/// An annotation as stored on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub xref: Xref,
    #[serde(flatten)]
    pub kind: ShapeKind,
    pub style: ShapeStyle,
    /// Free-form `/Contents` of annotations without a text payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

impl Annotation {
    /// Area used for selection and hit-testing.
    ///
    /// Lines are widened by their stroke so horizontal and vertical lines
    /// can still be picked.
    pub fn bounding_rect(&self) -> Rect {
        match &self.kind {
            ShapeKind::Line { start, end } => {
                Rect::from_corners(*start, *end).inflate(f64::from(self.style.width.max(1)))
            }
            ShapeKind::StickyNote { point, .. } => Rect::new(
                point.x,
                point.y,
                point.x + NOTE_ICON_SIZE,
                point.y + NOTE_ICON_SIZE,
            ),
            ShapeKind::Rectangle { rect }
            | ShapeKind::Circle { rect }
            | ShapeKind::Highlight { rect }
            | ShapeKind::FreeText { rect, .. }
            | ShapeKind::Redaction { rect }
            | ShapeKind::Other { rect, .. } => *rect,
        }
    }

    /// Text shown in annotation listings.
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            ShapeKind::FreeText { text, .. } | ShapeKind::StickyNote { text, .. } => Some(text),
            _ => self.contents.as_deref(),
        }
    }
}

impl fmt::Display for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.bounding_rect();
        write!(
            f,
            "{} {} at ({:.0}, {:.0}) size {:.0} x {:.0}",
            self.xref,
            self.kind.label(),
            r.x0,
            r.y0,
            r.width(),
            r.height()
        )?;
        if let Some(text) = self.text().filter(|t| !t.is_empty()) {
            let short: String = text.chars().take(30).collect();
            write!(f, ": {short}")?;
        }
        Ok(())
    }
}

/// Active editing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    #[default]
    Select,
    Line,
    Rectangle,
    Circle,
    Highlight,
    Note,
    Text,
    Redact,
}

impl Tool {
    /// Tools that draw a shape by dragging out two corners.
    pub fn is_drag_shape(self) -> bool {
        matches!(
            self,
            Tool::Line | Tool::Rectangle | Tool::Circle | Tool::Highlight | Tool::Redact
        )
    }

    /// Tools that place a text item on a single press.
    pub fn needs_text(self) -> bool {
        matches!(self, Tool::Note | Tool::Text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_free_text_sizing() {
        let kind = ShapeKind::free_text(Point::new(10.0, 20.0), "Hello", 12);
        let ShapeKind::FreeText { rect, font_size, .. } = kind else {
            panic!("expected free text");
        };
        assert_eq!(font_size, 12);
        assert!((rect.width() - (5.0 * 12.0 * 0.6 + 20.0)).abs() < 1e-9);
        assert!((rect.height() - 22.0).abs() < 1e-9);
        assert_eq!(rect.top_left(), Point::new(10.0, 20.0));
    }

    #[test]
    fn test_free_text_font_size_clamped() {
        let big = ShapeKind::free_text(Point::default(), "x", 200);
        let small = ShapeKind::free_text(Point::default(), "x", 1);
        assert!(matches!(big, ShapeKind::FreeText { font_size: 72, .. }));
        assert!(matches!(small, ShapeKind::FreeText { font_size: 6, .. }));
    }

    #[test]
    fn test_line_translates_both_endpoints() {
        let line = ShapeKind::Line {
            start: Point::new(0.0, 0.0),
            end: Point::new(10.0, 5.0),
        };
        assert_eq!(
            line.translated(2.0, -1.0),
            ShapeKind::Line {
                start: Point::new(2.0, -1.0),
                end: Point::new(12.0, 4.0),
            }
        );
    }

    #[test]
    fn test_horizontal_line_is_selectable() {
        let annot = Annotation {
            xref: Xref(1),
            kind: ShapeKind::Line {
                start: Point::new(0.0, 50.0),
                end: Point::new(100.0, 50.0),
            },
            style: ShapeStyle::default(),
            contents: None,
        };
        assert!(annot.bounding_rect().contains(Point::new(40.0, 51.5)));
    }

    #[test]
    fn test_color_hex() {
        let c: Color = "#ff8000".parse().unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 128.0 / 255.0).abs() < 1e-9);
        assert_eq!(c.to_hex(), "#ff8000");
        assert!("red".parse::<Color>().is_err());
        assert!("#12345".parse::<Color>().is_err());
    }

    #[test]
    fn test_display_truncates_text() {
        let annot = Annotation {
            xref: Xref(7),
            kind: ShapeKind::StickyNote {
                point: Point::new(1.0, 2.0),
                text: "a".repeat(50),
            },
            style: ShapeStyle::default(),
            contents: None,
        };
        let shown = annot.to_string();
        assert!(shown.starts_with("#7 Note at (1, 2) size 20 x 20: "));
        assert!(shown.ends_with(&"a".repeat(30)));
    }
}
