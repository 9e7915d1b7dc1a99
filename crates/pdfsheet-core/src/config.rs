use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::annotate::geometry::Zoom;
use crate::annotate::session::DEFAULT_EDITED_SUFFIX;
use crate::annotate::shape::{Color, ShapeStyle};
use crate::batch::ConvertOptions;
use crate::error::PdfsheetError;

/// User settings, read from a JSON file. Every field is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Put all tables of a document into one sheet.
    pub merge_tables: bool,
    /// Where converted workbooks go; next to each PDF when unset.
    pub output_dir: Option<PathBuf>,
    /// Appended to the file stem when saving an edited PDF.
    pub edited_suffix: String,
    pub tool: ToolDefaults,
    /// Initial zoom of the editor, in percent.
    pub zoom_percent: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            merge_tables: false,
            output_dir: None,
            edited_suffix: DEFAULT_EDITED_SUFFIX.to_string(),
            tool: ToolDefaults::default(),
            zoom_percent: 100,
        }
    }
}

impl Settings {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            merge: self.merge_tables,
            output_dir: self.output_dir.clone(),
        }
    }
}

/// Initial style of newly drawn annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolDefaults {
    pub color: Color,
    pub fill: Option<Color>,
    pub opacity: f64,
    pub line_width: u32,
}

impl Default for ToolDefaults {
    fn default() -> Self {
        let style = ShapeStyle::default();
        Self {
            color: style.color,
            fill: style.fill,
            opacity: style.opacity,
            line_width: style.width,
        }
    }
}

impl ToolDefaults {
    pub fn style(&self) -> ShapeStyle {
        ShapeStyle {
            color: self.color,
            fill: self.fill,
            opacity: self.opacity,
            width: self.line_width,
        }
    }
}

/// Load settings from a JSON file.
pub fn load_settings(path: &Path) -> Result<Settings, PdfsheetError> {
    let content = std::fs::read_to_string(path).map_err(|e| PdfsheetError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let settings: Settings =
        serde_json::from_str(&content).map_err(|e| PdfsheetError::ConfigLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_settings(&settings)?;
    tracing::debug!(path = %path.display(), "settings loaded");
    Ok(settings)
}

/// Parse settings from a JSON string (no file path context).
pub fn parse_settings_str(json: &str) -> Result<Settings, PdfsheetError> {
    let settings: Settings = serde_json::from_str(json)?;
    validate_settings(&settings)?;
    Ok(settings)
}

pub fn validate_settings(settings: &Settings) -> Result<(), PdfsheetError> {
    if settings.edited_suffix.is_empty() {
        return Err(PdfsheetError::ConfigInvalid(
            "edited_suffix must not be empty".into(),
        ));
    }
    if settings
        .edited_suffix
        .contains(|c: char| std::path::is_separator(c))
    {
        return Err(PdfsheetError::ConfigInvalid(format!(
            "edited_suffix '{}' must not contain a path separator",
            settings.edited_suffix
        )));
    }

    let min = (Zoom::MIN * 100.0) as u32;
    let max = (Zoom::MAX * 100.0) as u32;
    if !(min..=max).contains(&settings.zoom_percent) {
        return Err(PdfsheetError::ConfigInvalid(format!(
            "zoom_percent {} outside {min}..={max}",
            settings.zoom_percent
        )));
    }

    let tool = &settings.tool;
    if !(0.0..=1.0).contains(&tool.opacity) {
        return Err(PdfsheetError::ConfigInvalid(format!(
            "tool opacity {} outside 0..=1",
            tool.opacity
        )));
    }
    if tool.line_width < 1 {
        return Err(PdfsheetError::ConfigInvalid(
            "tool line_width must be at least 1".into(),
        ));
    }
    for (name, color) in [("color", Some(tool.color)), ("fill", tool.fill)] {
        if color.is_some_and(|c| !c.is_valid()) {
            return Err(PdfsheetError::ConfigInvalid(format!(
                "tool {name} channels must be within 0..=1"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_gives_defaults() {
        let settings = parse_settings_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.edited_suffix, "_edited");
        assert_eq!(settings.tool.color, Color::RED);
        assert_eq!(settings.tool.line_width, 2);
    }

    #[test]
    fn test_parse_full_settings() {
        let json = r#"{
            "merge_tables": true,
            "output_dir": "out",
            "edited_suffix": "_annotated",
            "tool": { "color": { "r": 0, "g": 0, "b": 1 }, "opacity": 0.5, "line_width": 3 },
            "zoom_percent": 150
        }"#;
        let settings = parse_settings_str(json).unwrap();
        assert!(settings.merge_tables);
        assert_eq!(settings.output_dir, Some(PathBuf::from("out")));
        assert_eq!(settings.tool.style().color, Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(settings.tool.style().width, 3);
        assert!(settings.convert_options().merge);
    }

    #[test]
    fn test_invalid_values_rejected() {
        for json in [
            r#"{ "edited_suffix": "" }"#,
            r#"{ "edited_suffix": "a/b" }"#,
            r#"{ "zoom_percent": 20 }"#,
            r#"{ "zoom_percent": 400 }"#,
            r#"{ "tool": { "opacity": 1.5 } }"#,
            r#"{ "tool": { "line_width": 0 } }"#,
            r#"{ "tool": { "fill": { "r": 2, "g": 0, "b": 0 } } }"#,
        ] {
            let err = parse_settings_str(json).unwrap_err();
            assert!(matches!(err, PdfsheetError::ConfigInvalid(_)), "{json}: {err}");
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = parse_settings_str(r#"{ "merge": true }"#).unwrap_err();
        assert!(matches!(err, PdfsheetError::Json(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_settings(Path::new("/nonexistent/pdfsheet.json")).unwrap_err();
        assert!(matches!(err, PdfsheetError::ConfigLoad { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "merge_tables": true }"#).unwrap();
        assert!(load_settings(&path).unwrap().merge_tables);
    }
}
