use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use pdfsheet_core::annotate::{
    Color, DocumentSession, LopdfStore, Point, RedactionMode, Rect, ShapeKind, Xref,
};
use pdfsheet_core::config::{load_settings, Settings};
use std::path::{Path, PathBuf};

use crate::output;
use crate::OutputFormat;

type Session = DocumentSession<LopdfStore>;

#[derive(Subcommand)]
pub enum AnnotAction {
    /// List the annotations of a page
    List {
        /// PDF file
        input_file: PathBuf,

        /// 1-based page number (default: every page)
        #[arg(short, long)]
        page: Option<u32>,

        /// Output format: table (default) or json
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        output: OutputFormat,
    },
    /// Add an annotation
    Add(AddArgs),
    /// Move an annotation by a document-space offset
    Move {
        #[command(flatten)]
        target: Target,

        /// Annotation id as shown by `list`
        #[arg(short, long)]
        xref: u32,

        /// Offset "DX,DY" in points
        #[arg(long, value_name = "DX,DY", value_parser = parse_point, allow_hyphen_values = true)]
        by: Point,
    },
    /// Delete one annotation
    Delete {
        #[command(flatten)]
        target: Target,

        /// Annotation id as shown by `list`
        #[arg(short, long)]
        xref: u32,
    },
    /// Delete every annotation on a page
    DeleteAll {
        #[command(flatten)]
        target: Target,
    },
    /// Black out areas of a page and remove the text beneath them
    Redact {
        #[command(flatten)]
        target: Target,

        /// Area "X0,Y0,X1,Y1" to redact; repeatable. Without any, the
        /// page's pending redaction marks are applied.
        #[arg(short, long, value_name = "X0,Y0,X1,Y1", value_parser = parse_rect, allow_hyphen_values = true)]
        area: Vec<Rect>,

        /// Only mark the areas; apply them later
        #[arg(long)]
        pending: bool,
    },
}

/// Document, page and destination shared by every editing command.
#[derive(Args)]
pub struct Target {
    /// PDF file
    input_file: PathBuf,

    /// 1-based page number
    #[arg(short, long, default_value_t = 1)]
    page: u32,

    /// Where to save (default: <name>_edited.pdf next to the input)
    #[arg(short = 'O', long = "out", value_name = "FILE")]
    out: Option<PathBuf>,

    /// JSON settings file (tool defaults, edited-file suffix)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    Line,
    Rectangle,
    Circle,
    Highlight,
    Note,
    Text,
}

#[derive(Args)]
pub struct AddArgs {
    #[command(flatten)]
    target: Target,

    /// Kind of annotation
    #[arg(value_enum)]
    shape: ShapeArg,

    /// Start corner, or the anchor of a note or text box, as "X,Y"
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    from: Point,

    /// Opposite corner or line end as "X,Y"
    #[arg(long, value_name = "X,Y", value_parser = parse_point, allow_hyphen_values = true)]
    to: Option<Point>,

    /// Text of a note or text box
    #[arg(short, long)]
    text: Option<String>,

    /// Font size of a text box (6-72)
    #[arg(long)]
    font_size: Option<u32>,

    /// Stroke colour as #rrggbb
    #[arg(long, value_parser = parse_color)]
    color: Option<Color>,

    /// Fill colour as #rrggbb
    #[arg(long, value_parser = parse_color)]
    fill: Option<Color>,

    /// Opacity between 0 and 1
    #[arg(long)]
    opacity: Option<f64>,

    /// Line width in points
    #[arg(long)]
    width: Option<u32>,
}

pub fn run(action: AnnotAction) -> Result<()> {
    match action {
        AnnotAction::List {
            input_file,
            page,
            output,
        } => list(&input_file, page, output),
        AnnotAction::Add(args) => add(args),
        AnnotAction::Move { target, xref, by } => {
            let mut session = open(&target)?;
            session.select_xref(Xref(xref))?;
            if !session.move_selected(by.x, by.y)? {
                eprintln!("Offset below one point, nothing moved");
                return Ok(());
            }
            save(&mut session, &target)
        }
        AnnotAction::Delete { target, xref } => {
            let mut session = open(&target)?;
            session.select_xref(Xref(xref))?;
            session.delete_selected()?;
            save(&mut session, &target)
        }
        AnnotAction::DeleteAll { target } => {
            let mut session = open(&target)?;
            let deleted = session.delete_all_on_page()?;
            eprintln!("Deleted {deleted} annotation(s) from page {}", target.page);
            if deleted == 0 {
                return Ok(());
            }
            save(&mut session, &target)
        }
        AnnotAction::Redact {
            target,
            area,
            pending,
        } => {
            let mut session = open(&target)?;
            for rect in area.iter().copied() {
                session.add_redaction(rect, RedactionMode::Pending)?;
            }
            if !pending {
                let applied = session.apply_redactions()?;
                eprintln!("Applied {applied} redaction(s) on page {}", target.page);
            }
            if !session.is_modified() {
                return Ok(());
            }
            save(&mut session, &target)
        }
    }
}

fn list(input_file: &Path, page: Option<u32>, output_format: OutputFormat) -> Result<()> {
    let store = LopdfStore::open(input_file)
        .with_context(|| format!("failed to open '{}'", input_file.display()))?;
    let mut session = Session::new();
    session.load(store, Some(input_file.to_path_buf()));

    let pages: Vec<u32> = match page {
        Some(p) => vec![p],
        None => (1..=session.page_count()).collect(),
    };
    let mut listing = Vec::with_capacity(pages.len());
    for p in pages {
        session.go_to_page(p)?;
        listing.push((p, session.annotations()?));
    }

    match output_format {
        OutputFormat::Json => output::json::print(&listing)?,
        OutputFormat::Table => print!("{}", output::table::format_annotations(&listing)),
    }
    Ok(())
}

fn add(args: AddArgs) -> Result<()> {
    let mut session = open(&args.target)?;
    let mut style = session.style().clone();
    if let Some(color) = args.color {
        style.color = color;
    }
    if args.fill.is_some() {
        style.fill = args.fill;
    }
    if let Some(opacity) = args.opacity {
        if !(0.0..=1.0).contains(&opacity) {
            bail!("opacity {opacity} outside 0..=1");
        }
        style.opacity = opacity;
    }
    if let Some(width) = args.width {
        style.width = width.max(1);
    }
    session.set_style(style);

    let from = args.from;
    let corners = || -> Result<Rect> {
        let to = args.to.context("--to is required for this shape")?;
        Ok(Rect::from_corners(from, to))
    };
    let xref = match args.shape {
        ShapeArg::Line => {
            let end = args.to.context("--to is required for a line")?;
            Some(session.create_shape(ShapeKind::Line { start: from, end })?)
        }
        ShapeArg::Rectangle => Some(session.create_shape(ShapeKind::Rectangle { rect: corners()? })?),
        ShapeArg::Circle => Some(session.create_shape(ShapeKind::Circle { rect: corners()? })?),
        ShapeArg::Highlight => Some(session.create_shape(ShapeKind::Highlight { rect: corners()? })?),
        ShapeArg::Note => session.add_sticky_note(from, args.text.as_deref().unwrap_or_default())?,
        ShapeArg::Text => session.add_text_box(
            from,
            args.text.as_deref().unwrap_or_default(),
            args.font_size,
        )?,
    };

    match xref {
        Some(xref) => {
            eprintln!("Added annotation {xref} on page {}", args.target.page);
            save(&mut session, &args.target)
        }
        None => {
            eprintln!("No text given, nothing added");
            Ok(())
        }
    }
}

fn open(target: &Target) -> Result<Session> {
    let settings = match &target.config {
        Some(path) => load_settings(path)?,
        None => Settings::default(),
    };
    let store = LopdfStore::open(&target.input_file)
        .with_context(|| format!("failed to open '{}'", target.input_file.display()))?;
    let mut session = Session::with_settings(&settings);
    session.load(store, Some(target.input_file.clone()));
    session.go_to_page(target.page)?;
    Ok(session)
}

fn save(session: &mut Session, target: &Target) -> Result<()> {
    let path = match &target.out {
        Some(path) => {
            session.save(path)?;
            path.clone()
        }
        None => session.save_edited()?,
    };
    eprintln!("Saved {}", path.display());
    Ok(())
}

fn parse_numbers<const N: usize>(value: &str, expected: &str) -> Result<[f64; N], String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    if parts.len() != N {
        return Err(format!("expected {expected}, got '{value}'"));
    }
    let mut numbers = [0.0; N];
    for (slot, part) in numbers.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("'{part}' is not a number"))?;
    }
    Ok(numbers)
}

fn parse_point(value: &str) -> Result<Point, String> {
    let [x, y] = parse_numbers(value, "X,Y")?;
    Ok(Point::new(x, y))
}

fn parse_rect(value: &str) -> Result<Rect, String> {
    let [x0, y0, x1, y1] = parse_numbers(value, "X0,Y0,X1,Y1")?;
    Ok(Rect::new(x0, y0, x1, y1))
}

fn parse_color(value: &str) -> Result<Color, String> {
    value.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct AnnotCli {
        #[command(subcommand)]
        action: AnnotAction,
    }

    #[test]
    fn test_negative_coordinates_accepted() {
        let cli = AnnotCli::try_parse_from([
            "pdfsheet", "add", "doc.pdf", "line", "--from", "-5,10", "--to", "20,-3",
        ])
        .unwrap();
        let AnnotAction::Add(args) = cli.action else {
            panic!("expected add");
        };
        assert_eq!(args.from, Point::new(-5.0, 10.0));
        assert_eq!(args.to, Some(Point::new(20.0, -3.0)));

        let cli = AnnotCli::try_parse_from([
            "pdfsheet", "redact", "doc.pdf", "--area", "-10,-10,50,20",
        ])
        .unwrap();
        let AnnotAction::Redact { area, .. } = cli.action else {
            panic!("expected redact");
        };
        assert_eq!(area, vec![Rect::new(-10.0, -10.0, 50.0, 20.0)]);
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10, 20.5").unwrap(), Point::new(10.0, 20.5));
        assert_eq!(parse_point("-5,3").unwrap(), Point::new(-5.0, 3.0));
        assert!(parse_point("10").is_err());
        assert!(parse_point("a,b").is_err());
    }

    #[test]
    fn test_parse_rect_normalizes() {
        let r = parse_rect("100,100,50,20").unwrap();
        assert_eq!(r, Rect::new(50.0, 20.0, 100.0, 100.0));
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("#ff0000").unwrap(), Color::RED);
        assert!(parse_color("red").is_err());
    }
}
