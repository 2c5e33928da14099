//! # PDF Serializer
//!
//! Turns a closed document into PDF bytes. Pages and their content streams
//! come first, then the page tree root, fonts, images and the shared
//! resource dictionary, and finally the info dictionary and the catalog.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.3            <- header (1.4 when an image has a soft mask)
//! 3 0 obj ... endobj  <- pages, each followed by its content stream
//! 1 0 obj ... endobj  <- page tree root
//! ...                 <- fonts, images
//! 2 0 obj ... endobj  <- resource dictionary
//! n-1 0 obj           <- info
//! n 0 obj             <- catalog
//! xref
//! trailer
//! %%EOF
//! ```

pub mod flate;
pub mod pages;
pub mod resources;
pub mod writer;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Local};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::encoding::text_string;
use crate::error::{FolioError, Result};
use crate::font::FontRegistry;
use crate::image_loader::ImageRegistry;
use pages::{LinkDest, Page, PageTree};
use writer::PdfWriter;

/// Document information dictionary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: Option<String>,
    pub subject: Option<String>,
    pub author: Option<String>,
    pub keywords: Option<String>,
    pub creator: Option<String>,
    /// Defaults to this crate's name and version.
    pub producer: Option<String>,
    /// Defaults to the time of closing.
    #[serde(skip)]
    pub creation_date: Option<DateTime<FixedOffset>>,
}

/// Initial zoom of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "ZoomValue", into = "ZoomValue")]
pub enum Zoom {
    #[default]
    Default,
    FullPage,
    FullWidth,
    Real,
    /// Zoom factor in percent.
    Percent(u32),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ZoomValue {
    Percent(u32),
    Name(String),
}

impl TryFrom<ZoomValue> for Zoom {
    type Error = FolioError;

    fn try_from(value: ZoomValue) -> Result<Self> {
        match value {
            ZoomValue::Percent(p) => Ok(Zoom::Percent(p)),
            ZoomValue::Name(name) => name.parse(),
        }
    }
}

impl From<Zoom> for ZoomValue {
    fn from(zoom: Zoom) -> Self {
        match zoom {
            Zoom::Percent(p) => ZoomValue::Percent(p),
            other => ZoomValue::Name(other.to_string()),
        }
    }
}

impl FromStr for Zoom {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(Zoom::Default),
            "fullpage" => Ok(Zoom::FullPage),
            "fullwidth" => Ok(Zoom::FullWidth),
            "real" => Ok(Zoom::Real),
            other => other
                .parse()
                .map(Zoom::Percent)
                .map_err(|_| FolioError::config(format!("Incorrect zoom display mode: {}", other))),
        }
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zoom::Default => f.write_str("default"),
            Zoom::FullPage => f.write_str("fullpage"),
            Zoom::FullWidth => f.write_str("fullwidth"),
            Zoom::Real => f.write_str("real"),
            Zoom::Percent(p) => write!(f, "{}", p),
        }
    }
}

/// Initial page layout of the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Default,
    Single,
    Continuous,
    Two,
}

impl FromStr for Layout {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "default" => Ok(Layout::Default),
            "single" => Ok(Layout::Single),
            "continuous" => Ok(Layout::Continuous),
            "two" => Ok(Layout::Two),
            other => Err(FolioError::config(format!("Incorrect layout display mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayMode {
    pub zoom: Zoom,
    pub layout: Layout,
}

/// The parts of a closed document the serializer reads.
pub struct DocumentParts<'a> {
    pub pages: &'a [Page],
    pub links: &'a [Option<LinkDest>],
    /// Default page size in points.
    pub default_size: (f64, f64),
    pub k: f64,
    pub alias: Option<&'a str>,
    pub fonts: &'a FontRegistry,
    pub images: &'a ImageRegistry,
    pub metadata: &'a Metadata,
    pub display: DisplayMode,
    pub compress: bool,
}

/// Serialize a closed document.
pub fn finalize(parts: DocumentParts<'_>) -> Result<Vec<u8>> {
    let with_alpha = parts.images.has_alpha();
    let mut w = PdfWriter::new(parts.compress);

    w.out(if with_alpha { "%PDF-1.4" } else { "%PDF-1.3" });
    w.out_bytes(b"%\xe2\xe3\xcf\xd3");

    let page_count = parts.pages.len();
    let page_ids = PageTree {
        pages: parts.pages,
        links: parts.links,
        default_size: parts.default_size,
        k: parts.k,
        alias: parts.alias,
        with_alpha,
    }
    .write(&mut w)?;

    let font_ids = resources::put_fonts(&mut w, parts.fonts);
    let image_ids = resources::put_images(&mut w, parts.images);
    resources::put_resource_dict(&mut w, parts.fonts, &font_ids, parts.images, &image_ids);

    let info = put_info(&mut w, parts.metadata);
    let root = put_catalog(&mut w, page_ids.first().copied(), parts.display);

    let objects = w.current_id();
    let bytes = w.finish(root, info);
    debug!(
        "Finalized PDF: {} pages, {} fonts, {} images, {} objects, {} bytes",
        page_count,
        parts.fonts.len(),
        parts.images.len(),
        objects,
        bytes.len()
    );
    Ok(bytes)
}

/// `D:YYYYMMDDHHmmSS+HH'mm'`
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    let offset = date.offset().local_minus_utc();
    let sign = if offset < 0 { '-' } else { '+' };
    let offset = offset.abs();
    format!(
        "D:{}{}{:02}'{:02}'",
        date.format("%Y%m%d%H%M%S"),
        sign,
        offset / 3600,
        offset % 3600 / 60
    )
}

fn put_info(w: &mut PdfWriter, metadata: &Metadata) -> usize {
    let id = w.new_object(None);
    w.out("<<");
    let producer = metadata
        .producer
        .clone()
        .unwrap_or_else(|| format!("folio {}", env!("CARGO_PKG_VERSION")));
    let date = metadata
        .creation_date
        .unwrap_or_else(|| Local::now().fixed_offset());
    let mut entry = |key: &str, value: &str| {
        let mut line = format!("/{} ", key).into_bytes();
        line.extend_from_slice(&text_string(value));
        w.out_bytes(&line);
    };
    entry("Producer", &producer);
    entry("CreationDate", &format_date(&date));
    let optional = [
        ("Author", &metadata.author),
        ("Creator", &metadata.creator),
        ("Keywords", &metadata.keywords),
        ("Subject", &metadata.subject),
        ("Title", &metadata.title),
    ];
    for (key, value) in optional {
        if let Some(value) = value {
            entry(key, value);
        }
    }
    w.out(">>");
    w.end_object();
    id
}

fn put_catalog(w: &mut PdfWriter, first_page: Option<usize>, display: DisplayMode) -> usize {
    let id = w.new_object(None);
    w.out("<<");
    w.out("/Type /Catalog");
    w.out("/Pages 1 0 R");
    if let Some(n) = first_page {
        let action = match display.zoom {
            Zoom::Default => None,
            Zoom::FullPage => Some("/Fit".to_string()),
            Zoom::FullWidth => Some("/FitH null".to_string()),
            Zoom::Real => Some("/XYZ null null 1".to_string()),
            Zoom::Percent(p) => Some(format!("/XYZ null null {:.2}", f64::from(p) / 100.0)),
        };
        if let Some(action) = action {
            w.out(&format!("/OpenAction [{} 0 R {}]", n, action));
        }
    }
    match display.layout {
        Layout::Default => {}
        Layout::Single => w.out("/PageLayout /SinglePage"),
        Layout::Continuous => w.out("/PageLayout /OneColumn"),
        Layout::Two => w.out("/PageLayout /TwoColumnLeft"),
    }
    w.out(">>");
    w.end_object();
    id
}
