//! # Document
//!
//! The mutable aggregate every producer writes into. A document moves through
//! `Empty → PageOpen → PageClosed → Finalized`; once finalized it only hands
//! out its bytes. Coordinates are in the user unit chosen at construction and
//! measured from the top-left corner of the page.
//!
//! Content goes into the open page's buffer as raw PDF operators. Fonts and
//! images are registered on first use and written once at close.

mod graphics;
mod text;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{FolioError, Result, StateError};
use crate::font::{CoreFonts, DefinitionDirectory, FontRegistry, FontSource};
use crate::image_loader::ImageRegistry;
use crate::model::{DocumentOptions, Orientation, PageSize};
use crate::output::Destination;
use crate::pdf::pages::{LinkDest, Page, PageLink};
use crate::pdf::{self, flate, DisplayMode, DocumentParts, Layout, Metadata, Zoom};

pub use crate::pdf::pages::{LinkId, LinkTarget};

/// A callback run at the top (header) or bottom (footer) of every page.
pub type Hook = Box<dyn FnMut(&mut Document) -> Result<()>>;

// ─── Value types ────────────────────────────────────────────────

/// A gray level or an RGB triple, 0-255 per component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Color {
    Gray(u8),
    Rgb(u8, u8, u8),
}

impl Color {
    /// The color operator, `gray` for the gray form and `rgb` for the
    /// three-component form. Black is always written as gray.
    fn operator(self, gray: &str, rgb: &str) -> String {
        match self {
            Color::Gray(v) | Color::Rgb(v @ 0, 0, 0) => format!("{:.3} {}", f64::from(v) / 255.0, gray),
            Color::Rgb(r, g, b) => format!(
                "{:.3} {:.3} {:.3} {}",
                f64::from(r) / 255.0,
                f64::from(g) / 255.0,
                f64::from(b) / 255.0,
                rgb
            ),
        }
    }
}

/// Individual cell edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

/// Cell border: none, the full frame, or a selection of edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "BorderValue", into = "BorderValue")]
pub enum Border {
    #[default]
    None,
    Frame,
    Sides(Sides),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum BorderValue {
    Flag(u8),
    Edges(String),
}

impl TryFrom<BorderValue> for Border {
    type Error = FolioError;

    fn try_from(value: BorderValue) -> Result<Self> {
        match value {
            BorderValue::Flag(0) => Ok(Border::None),
            BorderValue::Flag(1) => Ok(Border::Frame),
            BorderValue::Flag(n) => Err(FolioError::config(format!("Incorrect border: {}", n))),
            BorderValue::Edges(s) => s.parse(),
        }
    }
}

impl From<Border> for BorderValue {
    fn from(border: Border) -> Self {
        match border {
            Border::None => BorderValue::Flag(0),
            Border::Frame => BorderValue::Flag(1),
            sides => BorderValue::Edges(sides.to_string()),
        }
    }
}

impl FromStr for Border {
    type Err = FolioError;

    /// `0`, `1`, or any combination of `L`, `T`, `R` and `B`.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "" | "0" => return Ok(Border::None),
            "1" => return Ok(Border::Frame),
            _ => {}
        }
        let mut sides = Sides::default();
        for c in s.chars() {
            match c.to_ascii_uppercase() {
                'L' => sides.left = true,
                'T' => sides.top = true,
                'R' => sides.right = true,
                'B' => sides.bottom = true,
                _ => return Err(FolioError::config(format!("Incorrect border: {}", s))),
            }
        }
        Ok(Border::Sides(sides))
    }
}

impl fmt::Display for Border {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Border::None => f.write_str("0"),
            Border::Frame => f.write_str("1"),
            Border::Sides(s) => {
                for (on, c) in [(s.left, "L"), (s.top, "T"), (s.right, "R"), (s.bottom, "B")] {
                    if on {
                        f.write_str(c)?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    /// Stretch word spacing to the cell width (multi-line cells only).
    Justify,
}

impl FromStr for Align {
    type Err = FolioError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "l" | "left" => Ok(Align::Left),
            "c" | "center" => Ok(Align::Center),
            "r" | "right" => Ok(Align::Right),
            "j" | "justify" => Ok(Align::Justify),
            other => Err(FolioError::config(format!("Incorrect alignment: {}", other))),
        }
    }
}

impl TryFrom<String> for Align {
    type Error = FolioError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Align> for String {
    fn from(align: Align) -> Self {
        match align {
            Align::Left => "L",
            Align::Center => "C",
            Align::Right => "R",
            Align::Justify => "J",
        }
        .to_string()
    }
}

/// Where the position goes after a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum LineBreak {
    /// To the right of the cell.
    #[default]
    Right,
    /// To the start of the next line.
    NextLine,
    /// Below the cell, same abscissa.
    Below,
}

impl TryFrom<u8> for LineBreak {
    type Error = FolioError;

    fn try_from(n: u8) -> Result<Self> {
        match n {
            0 => Ok(LineBreak::Right),
            1 => Ok(LineBreak::NextLine),
            2 => Ok(LineBreak::Below),
            other => Err(FolioError::config(format!("Incorrect line break: {}", other))),
        }
    }
}

impl From<LineBreak> for u8 {
    fn from(ln: LineBreak) -> Self {
        match ln {
            LineBreak::Right => 0,
            LineBreak::NextLine => 1,
            LineBreak::Below => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RectStyle {
    #[default]
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "F")]
    Fill,
    #[serde(rename = "DF", alias = "FD")]
    DrawFill,
}

impl RectStyle {
    fn operator(self) -> &'static str {
        match self {
            RectStyle::Draw => "S",
            RectStyle::Fill => "f",
            RectStyle::DrawFill => "B",
        }
    }
}

// ─── Document ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Empty,
    PageOpen,
    PageClosed,
    Finalized,
}

pub struct Document {
    state: State,
    /// Points per user unit.
    k: f64,
    def_orientation: Orientation,
    cur_orientation: Orientation,
    /// Portrait size of the default page in user units.
    def_page_size: (f64, f64),
    cur_page_size: (f64, f64),
    cur_rotation: i32,
    /// Current page dimensions in user units and in points.
    w: f64,
    h: f64,
    w_pt: f64,
    h_pt: f64,
    pages: Vec<Page>,

    l_margin: f64,
    t_margin: f64,
    r_margin: f64,
    b_margin: f64,
    c_margin: f64,
    x: f64,
    y: f64,
    lasth: f64,
    line_width: f64,

    font_source: Box<dyn FontSource>,
    fonts: FontRegistry,
    font_family: String,
    font_style: String,
    underline: bool,
    current_font: Option<String>,
    font_size_pt: f64,
    font_size: f64,

    draw_color: String,
    fill_color: String,
    text_color: String,
    color_flag: bool,
    ws: f64,

    images: ImageRegistry,
    links: Vec<Option<LinkDest>>,

    auto_page_break: bool,
    page_break_trigger: f64,
    in_header: bool,
    in_footer: bool,
    header: Option<Hook>,
    footer: Option<Hook>,

    alias: Option<String>,
    display: DisplayMode,
    compress: bool,
    metadata: Metadata,
    buffer: Option<Vec<u8>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("state", &self.state)
            .field("pages", &self.pages.len())
            .field("fonts", &self.fonts.len())
            .field("images", &self.images.len())
            .field("x", &self.x)
            .field("y", &self.y)
            .finish_non_exhaustive()
    }
}

impl Default for Document {
    /// Portrait A4 in millimeters.
    fn default() -> Self {
        let k = 72.0 / 25.4;
        let (w, h) = (595.28 / k, 841.89 / k);
        let margin = 28.35 / k;
        Document {
            state: State::Empty,
            k,
            def_orientation: Orientation::Portrait,
            cur_orientation: Orientation::Portrait,
            def_page_size: (w, h),
            cur_page_size: (w, h),
            cur_rotation: 0,
            w,
            h,
            w_pt: w * k,
            h_pt: h * k,
            pages: Vec::new(),
            l_margin: margin,
            t_margin: margin,
            r_margin: margin,
            b_margin: 2.0 * margin,
            c_margin: margin / 10.0,
            x: margin,
            y: margin,
            lasth: 0.0,
            line_width: 0.567 / k,
            font_source: Box::new(CoreFonts),
            fonts: FontRegistry::new(),
            font_family: String::new(),
            font_style: String::new(),
            underline: false,
            current_font: None,
            font_size_pt: 12.0,
            font_size: 12.0 / k,
            draw_color: "0 G".to_string(),
            fill_color: "0 g".to_string(),
            text_color: "0 g".to_string(),
            color_flag: false,
            ws: 0.0,
            images: ImageRegistry::new(),
            links: Vec::new(),
            auto_page_break: true,
            page_break_trigger: h - 2.0 * margin,
            in_header: false,
            in_footer: false,
            header: None,
            footer: None,
            alias: None,
            display: DisplayMode::default(),
            compress: flate::AVAILABLE,
            metadata: Metadata::default(),
            buffer: None,
        }
    }
}

impl Document {
    /// Create a document. Fails on a bad page size before anything is built.
    pub fn new(options: DocumentOptions) -> Result<Self> {
        let k = options.unit.scale();
        let size = options.size.dimensions(k)?;
        let (w, h) = match options.orientation {
            Orientation::Portrait => size,
            Orientation::Landscape => (size.1, size.0),
        };
        let margin = 28.35 / k;

        let mut doc = Document {
            k,
            def_orientation: options.orientation,
            cur_orientation: options.orientation,
            def_page_size: size,
            cur_page_size: size,
            w,
            h,
            w_pt: w * k,
            h_pt: h * k,
            c_margin: margin / 10.0,
            line_width: 0.567 / k,
            font_size: 12.0 / k,
            metadata: options.metadata,
            display: options.display_mode,
            ..Document::default()
        };
        doc.set_margins(margin, margin, None);
        doc.set_auto_page_break(true, 2.0 * margin);
        if let Some(m) = options.margins {
            doc.set_margins(m.left, m.top, m.right);
        }
        if let Some(apb) = options.auto_page_break {
            doc.set_auto_page_break(apb.enabled, apb.margin);
        }
        if let Some(alias) = options.alias_nb_pages {
            doc.alias = Some(alias);
        }
        if let Some(dir) = options.font_path {
            doc.font_source = Box::new(DefinitionDirectory::new(dir));
        }
        doc.set_compression(options.compress);
        Ok(doc)
    }

    /// Replace where `set_font` and `add_font` load definitions from.
    pub fn set_font_source(&mut self, source: impl FontSource + 'static) {
        self.font_source = Box::new(source);
    }

    // ─── Lifecycle ──────────────────────────────────────────────

    fn ensure_not_closed(&self) -> Result<()> {
        if self.state == State::Finalized {
            return Err(StateError::DocumentClosed.into());
        }
        Ok(())
    }

    fn ensure_page(&self) -> Result<()> {
        match self.state {
            State::PageOpen => Ok(()),
            State::Finalized => Err(StateError::DocumentClosed.into()),
            State::Empty | State::PageClosed => Err(StateError::NoActivePage.into()),
        }
    }

    /// Append one line of operators to the open page.
    pub(crate) fn out(&mut self, line: &[u8]) -> Result<()> {
        self.ensure_page()?;
        if let Some(page) = self.pages.last_mut() {
            page.content.extend_from_slice(line);
            page.content.push(b'\n');
        }
        Ok(())
    }

    fn out_str(&mut self, line: &str) -> Result<()> {
        self.out(line.as_bytes())
    }

    /// Start a new page with the default orientation and size.
    pub fn add_page(&mut self) -> Result<()> {
        self.add_page_with(None, None, 0)
    }

    /// Start a new page. `None` keeps the document default; `rotation` must
    /// be a multiple of 90.
    pub fn add_page_with(
        &mut self,
        orientation: Option<Orientation>,
        size: Option<PageSize>,
        rotation: i32,
    ) -> Result<()> {
        self.ensure_not_closed()?;
        if rotation % 90 != 0 {
            return Err(FolioError::config(format!(
                "Incorrect rotation value: {}. Only multiples of 90 are allowed",
                rotation
            )));
        }
        let size = size.map(|s| s.dimensions(self.k)).transpose()?;
        self.open_page(orientation, size, rotation)
    }

    pub(crate) fn open_page(
        &mut self,
        orientation: Option<Orientation>,
        size: Option<(f64, f64)>,
        rotation: i32,
    ) -> Result<()> {
        let family = self.font_family.clone();
        let style = format!("{}{}", self.font_style, if self.underline { "U" } else { "" });
        let font_size = self.font_size_pt;
        let lw = self.line_width;
        let dc = self.draw_color.clone();
        let fc = self.fill_color.clone();
        let tc = self.text_color.clone();
        let cf = self.color_flag;

        if self.state == State::PageOpen {
            self.run_footer()?;
            self.state = State::PageClosed;
        }

        self.begin_page(orientation, size, rotation);
        // Square line caps
        self.out_str("2 J")?;
        self.line_width = lw;
        self.out_str(&format!("{:.2} w", lw * self.k))?;
        if !family.is_empty() {
            self.set_font(&family, &style, font_size)?;
        }
        self.draw_color = dc.clone();
        if dc != "0 G" {
            self.out_str(&dc)?;
        }
        self.fill_color = fc.clone();
        if fc != "0 g" {
            self.out_str(&fc)?;
        }
        self.text_color = tc.clone();
        self.color_flag = cf;

        self.run_header()?;

        // Undo whatever the header changed
        if self.line_width != lw {
            self.line_width = lw;
            self.out_str(&format!("{:.2} w", lw * self.k))?;
        }
        if !family.is_empty() {
            self.set_font(&family, &style, font_size)?;
        }
        if self.draw_color != dc {
            self.out_str(&dc)?;
            self.draw_color = dc;
        }
        if self.fill_color != fc {
            self.out_str(&fc)?;
            self.fill_color = fc;
        }
        self.text_color = tc;
        self.color_flag = cf;
        Ok(())
    }

    fn begin_page(&mut self, orientation: Option<Orientation>, size: Option<(f64, f64)>, rotation: i32) {
        self.pages.push(Page::default());
        self.state = State::PageOpen;
        self.x = self.l_margin;
        self.y = self.t_margin;
        self.font_family.clear();

        let orientation = orientation.unwrap_or(self.def_orientation);
        let size = size.unwrap_or(self.def_page_size);
        if orientation != self.cur_orientation || size != self.cur_page_size {
            let (w, h) = match orientation {
                Orientation::Portrait => size,
                Orientation::Landscape => (size.1, size.0),
            };
            self.w = w;
            self.h = h;
            self.w_pt = w * self.k;
            self.h_pt = h * self.k;
            self.page_break_trigger = self.h - self.b_margin;
            self.cur_orientation = orientation;
            self.cur_page_size = size;
        }
        let (w_pt, h_pt) = (self.w_pt, self.h_pt);
        let default = orientation == self.def_orientation && size == self.def_page_size;
        if let Some(page) = self.pages.last_mut() {
            if !default {
                page.size = Some((w_pt, h_pt));
            }
            page.rotation = rotation;
        }
        self.cur_rotation = rotation;
    }

    fn run_header(&mut self) -> Result<()> {
        let Some(mut hook) = self.header.take() else {
            return Ok(());
        };
        self.in_header = true;
        let result = hook(self);
        self.in_header = false;
        if self.header.is_none() {
            self.header = Some(hook);
        }
        result
    }

    fn run_footer(&mut self) -> Result<()> {
        let Some(mut hook) = self.footer.take() else {
            return Ok(());
        };
        self.in_footer = true;
        let result = hook(self);
        self.in_footer = false;
        if self.footer.is_none() {
            self.footer = Some(hook);
        }
        result
    }

    /// Run `hook` after each page opens. Whatever it changes in the line
    /// width, font and colors is undone afterwards.
    pub fn set_header(&mut self, hook: impl FnMut(&mut Document) -> Result<()> + 'static) {
        self.header = Some(Box::new(hook));
    }

    /// Run `hook` before each page closes, including the last one.
    pub fn set_footer(&mut self, hook: impl FnMut(&mut Document) -> Result<()> + 'static) {
        self.footer = Some(Box::new(hook));
    }

    /// Current page number, 0 before the first page.
    pub fn page_no(&self) -> usize {
        self.pages.len()
    }

    /// Replace `alias` with the total page count in all page content at close.
    pub fn alias_nb_pages(&mut self, alias: &str) {
        self.alias = Some(alias.to_string());
    }

    /// Close the document: run the last footer and serialize everything.
    /// Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.state == State::Finalized {
            return Ok(());
        }
        if self.state == State::Empty {
            self.add_page()?;
        }
        // A failed finalize leaves the last page closed; retrying goes
        // straight to serialization.
        if self.state == State::PageOpen {
            self.run_footer()?;
            self.state = State::PageClosed;
        }

        let (dw, dh) = self.def_page_size;
        let default_size = match self.def_orientation {
            Orientation::Portrait => (dw * self.k, dh * self.k),
            Orientation::Landscape => (dh * self.k, dw * self.k),
        };
        let bytes = pdf::finalize(DocumentParts {
            pages: &self.pages,
            links: &self.links,
            default_size,
            k: self.k,
            alias: self.alias.as_deref(),
            fonts: &self.fonts,
            images: &self.images,
            metadata: &self.metadata,
            display: self.display,
            compress: self.compress,
        })?;
        self.buffer = Some(bytes);
        self.state = State::Finalized;
        Ok(())
    }

    /// Close the document and deliver it. Returns the PDF bytes; `File`
    /// also writes them to disk.
    pub fn output(&mut self, dest: Destination) -> Result<Vec<u8>> {
        self.close()?;
        let bytes = self.buffer.clone().unwrap_or_default();
        if let Destination::File(path) = &dest {
            std::fs::write(path, &bytes)?;
        }
        Ok(bytes)
    }

    /// Close the document and take its bytes.
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.close()?;
        Ok(self.buffer.take().unwrap_or_default())
    }

    // ─── Geometry ───────────────────────────────────────────────

    /// Set the left, top and right margins. The right one defaults to the left.
    pub fn set_margins(&mut self, left: f64, top: f64, right: Option<f64>) {
        self.l_margin = left;
        self.t_margin = top;
        self.r_margin = right.unwrap_or(left);
    }

    pub fn set_left_margin(&mut self, margin: f64) {
        self.l_margin = margin;
        if !self.pages.is_empty() && self.x < margin {
            self.x = margin;
        }
    }

    pub fn set_top_margin(&mut self, margin: f64) {
        self.t_margin = margin;
    }

    pub fn set_right_margin(&mut self, margin: f64) {
        self.r_margin = margin;
    }

    /// Turn automatic page breaks on or off. `margin` is the distance from
    /// the bottom of the page that triggers one.
    pub fn set_auto_page_break(&mut self, auto: bool, margin: f64) {
        self.auto_page_break = auto;
        self.b_margin = margin;
        self.page_break_trigger = self.h - margin;
    }

    pub fn get_x(&self) -> f64 {
        self.x
    }

    /// Negative values count from the right edge.
    pub fn set_x(&mut self, x: f64) {
        self.x = if x >= 0.0 { x } else { self.w + x };
    }

    pub fn get_y(&self) -> f64 {
        self.y
    }

    /// Negative values count from the bottom edge.
    pub fn set_y(&mut self, y: f64, reset_x: bool) {
        self.y = if y >= 0.0 { y } else { self.h + y };
        if reset_x {
            self.x = self.l_margin;
        }
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_x(x);
        self.set_y(y, false);
    }

    pub fn page_width(&self) -> f64 {
        self.w
    }

    pub fn page_height(&self) -> f64 {
        self.h
    }

    /// Whether content about to take `h` at the current position should
    /// start on a new page.
    fn needs_break(&self, h: f64) -> bool {
        self.y + h > self.page_break_trigger && !self.in_header && !self.in_footer && self.auto_page_break
    }

    /// Break to a new page with the current layout, keeping the abscissa.
    fn page_break(&mut self) -> Result<()> {
        let x = self.x;
        self.open_page(
            Some(self.cur_orientation),
            Some(self.cur_page_size),
            self.cur_rotation,
        )?;
        self.x = x;
        Ok(())
    }

    // ─── Links ──────────────────────────────────────────────────

    /// Create an internal link. Point it somewhere with [`Document::set_link`].
    pub fn add_link(&mut self) -> LinkId {
        self.links.push(None);
        LinkId(self.links.len())
    }

    /// Set where `link` lands. `y = -1` means the current position and a
    /// missing page the current page.
    pub fn set_link(&mut self, link: LinkId, y: f64, page: Option<usize>) -> Result<()> {
        self.ensure_not_closed()?;
        let y = if y == -1.0 { self.y } else { y };
        let page = page.unwrap_or(self.pages.len());
        let slot = self
            .links
            .get_mut(link.0.wrapping_sub(1))
            .ok_or_else(|| FolioError::config(format!("Unknown link: {}", link.0)))?;
        *slot = Some(LinkDest { page, y });
        Ok(())
    }

    /// Make a rectangle of the current page clickable.
    pub fn link(&mut self, x: f64, y: f64, w: f64, h: f64, target: impl Into<LinkTarget>) -> Result<()> {
        self.ensure_page()?;
        let (k, h_pt) = (self.k, self.h_pt);
        if let Some(page) = self.pages.last_mut() {
            page.links.push(PageLink {
                x: x * k,
                y: h_pt - y * k,
                w: w * k,
                h: h * k,
                target: target.into(),
            });
        }
        Ok(())
    }

    // ─── Document settings ──────────────────────────────────────

    pub fn set_display_mode(&mut self, zoom: Zoom, layout: Layout) {
        self.display = DisplayMode { zoom, layout };
    }

    /// Compress page streams. Stays off without the `deflate` feature.
    pub fn set_compression(&mut self, compress: bool) {
        if compress && !flate::AVAILABLE {
            warn!("Compression requested but folio was built without the 'deflate' feature");
        }
        self.compress = compress && flate::AVAILABLE;
    }

    pub fn set_title(&mut self, title: &str) {
        self.metadata.title = Some(title.to_string());
    }

    pub fn set_subject(&mut self, subject: &str) {
        self.metadata.subject = Some(subject.to_string());
    }

    pub fn set_author(&mut self, author: &str) {
        self.metadata.author = Some(author.to_string());
    }

    pub fn set_keywords(&mut self, keywords: &str) {
        self.metadata.keywords = Some(keywords.to_string());
    }

    pub fn set_creator(&mut self, creator: &str) {
        self.metadata.creator = Some(creator.to_string());
    }

    pub fn set_producer(&mut self, producer: &str) {
        self.metadata.producer = Some(producer.to_string());
    }

    pub fn set_creation_date(&mut self, date: DateTime<FixedOffset>) {
        self.metadata.creation_date = Some(date);
    }
}
