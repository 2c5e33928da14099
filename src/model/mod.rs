//! # Document Model
//!
//! Serializable configuration for a [`crate::Document`] and the JSON script
//! format the CLI renders. A script is a list of pages, each with a list of
//! operations that mirror the document API one to one:
//!
//! ```json
//! {
//!   "options": { "unit": "mm", "size": "A4", "metadata": { "title": "Hello" } },
//!   "pages": [
//!     { "ops": [
//!       { "op": "setFont", "family": "helvetica", "style": "B", "size": 16 },
//!       { "op": "cell", "w": 40, "h": 10, "text": "Hello World!" }
//!     ] }
//!   ]
//! }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::{Align, Border, Color, LineBreak, RectStyle};
use crate::error::{FolioError, Result};
use crate::pdf::{DisplayMode, Metadata};

// ─── Page geometry ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl FromStr for Orientation {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "p" | "portrait" => Ok(Orientation::Portrait),
            "l" | "landscape" => Ok(Orientation::Landscape),
            other => Err(FolioError::config(format!("Incorrect orientation: {}", other))),
        }
    }
}

impl TryFrom<String> for Orientation {
    type Error = FolioError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Orientation> for String {
    fn from(o: Orientation) -> Self {
        o.to_string()
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Orientation::Portrait => "portrait",
            Orientation::Landscape => "landscape",
        })
    }
}

/// User unit. Every coordinate and length passed to a document is in this unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Unit {
    Pt,
    #[default]
    Mm,
    Cm,
    In,
}

impl Unit {
    /// Points per user unit.
    pub fn scale(self) -> f64 {
        match self {
            Unit::Pt => 1.0,
            Unit::Mm => 72.0 / 25.4,
            Unit::Cm => 72.0 / 2.54,
            Unit::In => 72.0,
        }
    }
}

impl FromStr for Unit {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pt" => Ok(Unit::Pt),
            "mm" => Ok(Unit::Mm),
            "cm" => Ok(Unit::Cm),
            "in" => Ok(Unit::In),
            other => Err(FolioError::config(format!("Unknown unit: {}", other))),
        }
    }
}

impl TryFrom<String> for Unit {
    type Error = FolioError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Unit> for String {
    fn from(u: Unit) -> Self {
        match u {
            Unit::Pt => "pt",
            Unit::Mm => "mm",
            Unit::Cm => "cm",
            Unit::In => "in",
        }
        .to_string()
    }
}

/// Standard page sizes, or a custom size in user units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "PageSizeValue", into = "PageSizeValue")]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PageSizeValue {
    Named(String),
    Custom { width: f64, height: f64 },
}

impl TryFrom<PageSizeValue> for PageSize {
    type Error = FolioError;

    fn try_from(value: PageSizeValue) -> Result<Self> {
        match value {
            PageSizeValue::Named(name) => name.parse(),
            PageSizeValue::Custom { width, height } => Ok(PageSize::Custom { width, height }),
        }
    }
}

impl From<PageSize> for PageSizeValue {
    fn from(size: PageSize) -> Self {
        let name = match size {
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
            PageSize::Custom { width, height } => return PageSizeValue::Custom { width, height },
        };
        PageSizeValue::Named(name.to_string())
    }
}

impl FromStr for PageSize {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            other => Err(FolioError::config(format!("Unknown page size: {}", other))),
        }
    }
}

impl PageSize {
    /// Portrait (width, height) in user units for scale factor `k`.
    /// Custom sizes are taken as given, short side first.
    pub fn dimensions(&self, k: f64) -> Result<(f64, f64)> {
        let (w, h) = match *self {
            PageSize::A3 => (841.89 / k, 1190.55 / k),
            PageSize::A4 => (595.28 / k, 841.89 / k),
            PageSize::A5 => (420.94 / k, 595.28 / k),
            PageSize::Letter => (612.0 / k, 792.0 / k),
            PageSize::Legal => (612.0 / k, 1008.0 / k),
            PageSize::Custom { width, height } => {
                if !(width > 0.0 && height > 0.0) || !width.is_finite() || !height.is_finite() {
                    return Err(FolioError::config(format!(
                        "Invalid page size: {} x {}",
                        width, height
                    )));
                }
                (width, height)
            }
        };
        Ok(if w > h { (h, w) } else { (w, h) })
    }
}

// ─── Document options ───────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub left: f64,
    pub top: f64,
    /// Defaults to the left margin.
    #[serde(default)]
    pub right: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutoPageBreak {
    pub enabled: bool,
    /// Distance from the bottom of the page that triggers a break.
    #[serde(default)]
    pub margin: f64,
}

/// Everything fixed when a document is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentOptions {
    pub orientation: Orientation,
    pub unit: Unit,
    pub size: PageSize,
    pub compress: bool,
    pub display_mode: DisplayMode,
    pub metadata: Metadata,
    /// Placeholder replaced by the total page count, usually `{nb}`.
    pub alias_nb_pages: Option<String>,
    pub margins: Option<Margins>,
    pub auto_page_break: Option<AutoPageBreak>,
    /// Directory of JSON font definitions.
    pub font_path: Option<PathBuf>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        DocumentOptions {
            orientation: Orientation::Portrait,
            unit: Unit::Mm,
            size: PageSize::A4,
            compress: true,
            display_mode: DisplayMode::default(),
            metadata: Metadata::default(),
            alias_nb_pages: None,
            margins: None,
            auto_page_break: None,
            font_path: None,
        }
    }
}

// ─── Scripts ────────────────────────────────────────────────────

/// A complete document script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSpec {
    pub options: DocumentOptions,
    /// Fonts to register before the first page.
    pub fonts: Vec<FontSpec>,
    /// Operations replayed at the top of every page.
    pub header: Vec<Op>,
    /// Operations replayed at the bottom of every page.
    pub footer: Vec<Op>,
    pub pages: Vec<PageSpec>,
}

/// A font to register. Without `src` the definition comes from the
/// document's font source; with it, `src` is a TrueType file to embed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSpec {
    pub family: String,
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default = "default_true")]
    pub subset: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    pub orientation: Option<Orientation>,
    pub size: Option<PageSize>,
    pub rotation: i32,
    pub ops: Vec<Op>,
}

/// One document operation. Links are URIs, or `#name` for an internal
/// link whose destination a `setLink` op with the same name defines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Op {
    AddPage {
        #[serde(default)]
        orientation: Option<Orientation>,
        #[serde(default)]
        size: Option<PageSize>,
        #[serde(default)]
        rotation: i32,
    },
    SetFont {
        family: String,
        #[serde(default)]
        style: String,
        #[serde(default)]
        size: f64,
    },
    SetFontSize {
        size: f64,
    },
    SetDrawColor {
        color: Color,
    },
    SetFillColor {
        color: Color,
    },
    SetTextColor {
        color: Color,
    },
    SetLineWidth {
        width: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    },
    Rect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        #[serde(default)]
        style: RectStyle,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
    },
    Cell {
        #[serde(default)]
        w: f64,
        #[serde(default)]
        h: f64,
        #[serde(default)]
        text: String,
        #[serde(default)]
        border: Border,
        #[serde(default)]
        ln: LineBreak,
        #[serde(default)]
        align: Align,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        link: Option<String>,
    },
    MultiCell {
        #[serde(default)]
        w: f64,
        h: f64,
        text: String,
        #[serde(default)]
        border: Border,
        #[serde(default = "justify")]
        align: Align,
        #[serde(default)]
        fill: bool,
    },
    Write {
        h: f64,
        text: String,
        #[serde(default)]
        link: Option<String>,
    },
    Ln {
        #[serde(default)]
        h: Option<f64>,
    },
    Image {
        src: String,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        w: f64,
        #[serde(default)]
        h: f64,
        #[serde(default, rename = "type")]
        format: Option<String>,
        #[serde(default)]
        link: Option<String>,
    },
    Link {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        link: String,
    },
    /// Point the internal link `name` at a position; `y = -1` means the
    /// current position, a missing page the current page.
    SetLink {
        name: String,
        #[serde(default)]
        y: f64,
        #[serde(default)]
        page: Option<usize>,
    },
    SetX {
        x: f64,
    },
    SetY {
        y: f64,
        #[serde(default = "default_true", rename = "resetX")]
        reset_x: bool,
    },
    #[serde(rename = "setXY")]
    SetXY {
        x: f64,
        y: f64,
    },
    SetMargins {
        left: f64,
        top: f64,
        #[serde(default)]
        right: Option<f64>,
    },
    SetLeftMargin {
        margin: f64,
    },
    SetTopMargin {
        margin: f64,
    },
    SetRightMargin {
        margin: f64,
    },
    SetAutoPageBreak {
        enabled: bool,
        #[serde(default)]
        margin: f64,
    },
}

fn justify() -> Align {
    Align::Justify
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::{Layout, Zoom};

    #[test]
    fn test_options_defaults() {
        let options: DocumentOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, DocumentOptions::default());
        assert_eq!(options.unit, Unit::Mm);
        assert!(options.compress);
    }

    #[test]
    fn test_options_from_json() {
        let json = r#"{
            "orientation": "L",
            "unit": "pt",
            "size": {"width": 200, "height": 100},
            "compress": false,
            "displayMode": {"zoom": "fullpage", "layout": "two"},
            "metadata": {"title": "T"},
            "aliasNbPages": "{nb}",
            "margins": {"left": 10, "top": 20},
            "autoPageBreak": {"enabled": false}
        }"#;
        let options: DocumentOptions = serde_json::from_str(json).unwrap();
        assert_eq!(options.orientation, Orientation::Landscape);
        assert_eq!(options.size.dimensions(1.0).unwrap(), (100.0, 200.0));
        assert_eq!(options.display_mode.zoom, Zoom::FullPage);
        assert_eq!(options.display_mode.layout, Layout::Two);
        assert_eq!(options.metadata.title.as_deref(), Some("T"));
        assert_eq!(options.margins.unwrap().right, None);
        assert!(!options.auto_page_break.unwrap().enabled);
    }

    #[test]
    fn test_bad_values_are_rejected() {
        assert!(serde_json::from_str::<DocumentOptions>(r#"{"unit": "furlong"}"#).is_err());
        assert!(serde_json::from_str::<DocumentOptions>(r#"{"size": "B5"}"#).is_err());
        assert!(serde_json::from_str::<DocumentOptions>(r#"{"orientation": "sideways"}"#).is_err());
        let size = PageSize::Custom { width: -1.0, height: 10.0 };
        assert!(matches!(size.dimensions(1.0), Err(FolioError::Configuration(_))));
    }

    #[test]
    fn test_named_sizes_in_user_units() {
        let (w, h) = "letter".parse::<PageSize>().unwrap().dimensions(72.0).unwrap();
        assert_eq!((w, h), (8.5, 11.0));
        let (w, _) = PageSize::A4.dimensions(Unit::Mm.scale()).unwrap();
        assert!((w - 210.0).abs() < 0.01);
    }

    #[test]
    fn test_ops_from_json() {
        let json = r##"{
            "fonts": [{"family": "dejavu", "src": "DejaVuSans.ttf"}],
            "pages": [{"rotation": 90, "ops": [
                {"op": "setFont", "family": "Arial", "style": "BU", "size": 14},
                {"op": "cell", "w": 40, "h": 10, "text": "Hi", "border": 1, "ln": 1, "align": "C", "link": "#top"},
                {"op": "multiCell", "w": 0, "h": 5, "text": "wrapped", "border": "LR"},
                {"op": "setTextColor", "color": [200, 0, 0]},
                {"op": "setFillColor", "color": 128},
                {"op": "rect", "x": 1, "y": 2, "w": 3, "h": 4, "style": "DF"},
                {"op": "setXY", "x": 5, "y": 6},
                {"op": "setLink", "name": "top"}
            ]}]
        }"##;
        let spec: DocumentSpec = serde_json::from_str(json).unwrap();
        assert!(spec.fonts[0].subset);
        let page = &spec.pages[0];
        assert_eq!(page.rotation, 90);
        assert_eq!(page.ops.len(), 8);
        match &page.ops[1] {
            Op::Cell { border, ln, align, link, .. } => {
                assert_eq!(*border, Border::Frame);
                assert_eq!(*ln, LineBreak::NextLine);
                assert_eq!(*align, Align::Center);
                assert_eq!(link.as_deref(), Some("#top"));
            }
            other => panic!("unexpected op {:?}", other),
        }
        match &page.ops[2] {
            Op::MultiCell { align, border, .. } => {
                assert_eq!(*align, Align::Justify);
                assert_eq!(*border, "LR".parse::<Border>().unwrap());
            }
            other => panic!("unexpected op {:?}", other),
        }
        assert!(matches!(page.ops[3], Op::SetTextColor { color: Color::Rgb(200, 0, 0) }));
        assert!(matches!(page.ops[4], Op::SetFillColor { color: Color::Gray(128) }));
        assert!(matches!(page.ops[5], Op::Rect { style: RectStyle::DrawFill, .. }));
    }

    #[test]
    fn test_unknown_op_is_a_parse_error() {
        let err: FolioError = serde_json::from_str::<DocumentSpec>(r#"{"pages": [{"ops": [{"op": "explode"}]}]}"#)
            .unwrap_err()
            .into();
        assert!(err.to_string().contains("Hint"));
    }
}
