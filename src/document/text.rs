//! Fonts and text: selection, measurement, single cells, wrapped cells and
//! flowing text. Strings are converted to cp1252 before they are measured,
//! so every width here is a sum of single-byte glyph widths.

use super::{Align, Border, Document, LineBreak, Sides, State};
use crate::encoding::{encode_cp1252, escape};
use crate::error::{FolioError, Result, StateError};
use crate::font::{embed, font_key, normalize_style, EmbedOptions, RegisteredFont, CORE_FAMILIES};
use crate::pdf::pages::LinkTarget;

impl Document {
    fn current_font(&self) -> Result<&RegisteredFont> {
        self.current_font
            .as_deref()
            .and_then(|key| self.fonts.get(key))
            .ok_or_else(|| StateError::NoFontSelected.into())
    }

    /// Lower-case the family, resolve the `arial` alias and normalize the
    /// style. Returns the family, the style without `U`, and the underline flag.
    fn resolve_family(family: &str, style: &str) -> (String, String, bool) {
        let mut family = family.to_lowercase();
        if family == "arial" {
            family = "helvetica".to_string();
        }
        let (mut style, underline) = normalize_style(style);
        if family == "symbol" || family == "zapfdingbats" {
            style.clear();
        }
        (family, style, underline)
    }

    /// Register a font from the document's font source without selecting it.
    pub fn add_font(&mut self, family: &str, style: &str) -> Result<()> {
        self.ensure_not_closed()?;
        let (family, style, _) = Self::resolve_family(family, style);
        let key = font_key(&family, &style);
        if self.fonts.contains(&key) {
            return Ok(());
        }
        let definition = self.font_source.load(&family, &style)?;
        self.fonts.insert(key, definition);
        Ok(())
    }

    /// Parse, optionally subset, and register a TrueType font under
    /// `family` and `style`.
    pub fn add_truetype_font(
        &mut self,
        family: &str,
        style: &str,
        data: &[u8],
        options: &EmbedOptions,
    ) -> Result<()> {
        self.ensure_not_closed()?;
        let (family, style, _) = Self::resolve_family(family, style);
        let key = font_key(&family, &style);
        if self.fonts.contains(&key) {
            return Ok(());
        }
        let definition = embed::truetype_definition(data, options)?;
        self.fonts.insert(key, definition);
        Ok(())
    }

    /// Select a font. An empty family keeps the current one and a size of 0
    /// keeps the current size. Core families load on first use; anything
    /// else must have been added first.
    pub fn set_font(&mut self, family: &str, style: &str, size: f64) -> Result<()> {
        self.ensure_not_closed()?;
        let family = if family.is_empty() { self.font_family.as_str() } else { family };
        let (family, style, underline) = Self::resolve_family(family, style);
        let size = if size == 0.0 { self.font_size_pt } else { size };

        self.underline = underline;
        if self.font_family == family && self.font_style == style && self.font_size_pt == size {
            return Ok(());
        }

        let key = font_key(&family, &style);
        if !self.fonts.contains(&key) {
            if !CORE_FAMILIES.contains(&family.as_str()) {
                return Err(FolioError::config(format!("Undefined font: {} {}", family, style)));
            }
            let definition = self.font_source.load(&family, &style)?;
            self.fonts.insert(key.clone(), definition);
        }

        self.font_family = family;
        self.font_style = style;
        self.font_size_pt = size;
        self.font_size = size / self.k;
        self.current_font = Some(key);
        self.select_current_font()
    }

    /// Change the size of the current font, in points.
    pub fn set_font_size(&mut self, size: f64) -> Result<()> {
        self.ensure_not_closed()?;
        if self.font_size_pt == size {
            return Ok(());
        }
        self.font_size_pt = size;
        self.font_size = size / self.k;
        self.select_current_font()
    }

    fn select_current_font(&mut self) -> Result<()> {
        if self.state != State::PageOpen {
            return Ok(());
        }
        let Ok(font) = self.current_font() else {
            return Ok(());
        };
        let line = format!("BT /F{} {:.2} Tf ET", font.index, self.font_size_pt);
        self.out_str(&line)
    }

    /// Width of `txt` in the current font, in user units.
    pub fn get_string_width(&self, txt: &str) -> Result<f64> {
        self.width_of(&encode_cp1252(txt))
    }

    fn width_of(&self, txt: &[u8]) -> Result<f64> {
        let font = self.current_font()?;
        Ok(f64::from(font.definition.string_width(txt)) * self.font_size / 1000.0)
    }

    /// The filled rectangle under `txt` drawn at baseline `(x, y)`.
    fn underline_op(&self, x: f64, y: f64, txt: &[u8]) -> Result<String> {
        let font = self.current_font()?;
        let up = f64::from(font.definition.underline_position);
        let ut = f64::from(font.definition.underline_thickness);
        let spaces = txt.iter().filter(|&&c| c == b' ').count() as f64;
        let w = self.width_of(txt)? + self.ws * spaces;
        Ok(format!(
            "{:.2} {:.2} {:.2} {:.2} re f",
            x * self.k,
            (self.h - (y - up / 1000.0 * self.font_size)) * self.k,
            w * self.k,
            -ut / 1000.0 * self.font_size_pt
        ))
    }

    /// Print `txt` with its baseline origin at `(x, y)`.
    pub fn text(&mut self, x: f64, y: f64, txt: &str) -> Result<()> {
        self.ensure_page()?;
        self.current_font()?;
        let bytes = encode_cp1252(txt);
        let mut s = format!("BT {:.2} {:.2} Td (", x * self.k, (self.h - y) * self.k).into_bytes();
        s.extend_from_slice(&escape(&bytes));
        s.extend_from_slice(b") Tj ET");
        if self.underline && !bytes.is_empty() {
            s.push(b' ');
            s.extend_from_slice(self.underline_op(x, y, &bytes)?.as_bytes());
        }
        if self.color_flag {
            let mut wrapped = format!("q {} ", self.text_color).into_bytes();
            wrapped.extend_from_slice(&s);
            wrapped.extend_from_slice(b" Q");
            s = wrapped;
        }
        self.out(&s)
    }

    /// Print a rectangular cell with optional border, background and link.
    /// A width of 0 extends the cell to the right margin.
    #[allow(clippy::too_many_arguments)]
    pub fn cell(
        &mut self,
        w: f64,
        h: f64,
        txt: &str,
        border: Border,
        ln: LineBreak,
        align: Align,
        fill: bool,
        link: Option<LinkTarget>,
    ) -> Result<()> {
        self.cell_bytes(w, h, &encode_cp1252(txt), border, ln, align, fill, link)
    }

    #[allow(clippy::too_many_arguments)]
    fn cell_bytes(
        &mut self,
        w: f64,
        h: f64,
        txt: &[u8],
        border: Border,
        ln: LineBreak,
        align: Align,
        fill: bool,
        link: Option<LinkTarget>,
    ) -> Result<()> {
        self.ensure_page()?;
        let k = self.k;
        if self.needs_break(h) {
            let ws = self.ws;
            if ws > 0.0 {
                self.ws = 0.0;
                self.out_str("0 Tw")?;
            }
            self.page_break()?;
            if ws > 0.0 {
                self.ws = ws;
                self.out_str(&format!("{:.3} Tw", ws * k))?;
            }
        }

        let w = if w == 0.0 { self.w - self.r_margin - self.x } else { w };
        let (x, y, page_h) = (self.x, self.y, self.h);
        let mut s: Vec<u8> = Vec::new();

        if fill || border == Border::Frame {
            let op = match (fill, border == Border::Frame) {
                (true, true) => "B",
                (true, false) => "f",
                _ => "S",
            };
            s.extend_from_slice(
                format!("{:.2} {:.2} {:.2} {:.2} re {} ", x * k, (page_h - y) * k, w * k, -h * k, op).as_bytes(),
            );
        }
        if let Border::Sides(sides) = border {
            let (top, bottom) = ((page_h - y) * k, (page_h - (y + h)) * k);
            let (left, right) = (x * k, (x + w) * k);
            let edges = [
                (sides.left, left, top, left, bottom),
                (sides.top, left, top, right, top),
                (sides.right, right, top, right, bottom),
                (sides.bottom, left, bottom, right, bottom),
            ];
            for (on, x1, y1, x2, y2) in edges {
                if on {
                    s.extend_from_slice(format!("{:.2} {:.2} m {:.2} {:.2} l S ", x1, y1, x2, y2).as_bytes());
                }
            }
        }

        if !txt.is_empty() {
            let sw = self.width_of(txt)?;
            let dx = match align {
                Align::Right => w - self.c_margin - sw,
                Align::Center => (w - sw) / 2.0,
                Align::Left | Align::Justify => self.c_margin,
            };
            if self.color_flag {
                s.extend_from_slice(format!("q {} ", self.text_color).as_bytes());
            }
            let baseline = y + 0.5 * h + 0.3 * self.font_size;
            s.extend_from_slice(
                format!("BT {:.2} {:.2} Td (", (x + dx) * k, (page_h - baseline) * k).as_bytes(),
            );
            s.extend_from_slice(&escape(txt));
            s.extend_from_slice(b") Tj ET");
            if self.underline {
                s.push(b' ');
                s.extend_from_slice(self.underline_op(x + dx, baseline, txt)?.as_bytes());
            }
            if self.color_flag {
                s.extend_from_slice(b" Q");
            }
            if let Some(link) = link {
                let fs = self.font_size;
                self.link(x + dx, y + 0.5 * h - 0.5 * fs, sw, fs, link)?;
            }
        }

        if !s.is_empty() {
            self.out(&s)?;
        }
        self.lasth = h;
        match ln {
            LineBreak::Right => self.x += w,
            LineBreak::NextLine => {
                self.y += h;
                self.x = self.l_margin;
            }
            LineBreak::Below => self.y += h,
        }
        Ok(())
    }

    /// Print `txt` as a column of cells of width `w`, breaking lines at
    /// spaces and at `\n`. The position ends at the start of the next line.
    pub fn multi_cell(
        &mut self,
        w: f64,
        h: f64,
        txt: &str,
        border: Border,
        align: Align,
        fill: bool,
    ) -> Result<()> {
        self.ensure_page()?;
        let cw = self.current_font()?.definition.widths.clone();
        let width = |c: u8| f64::from(cw.get(c as usize).copied().unwrap_or(0));

        let w = if w == 0.0 { self.w - self.r_margin - self.x } else { w };
        let wmax = (w - 2.0 * self.c_margin) * 1000.0 / self.font_size;
        let s: Vec<u8> = encode_cp1252(txt).into_iter().filter(|&c| c != b'\r').collect();
        let mut nb = s.len();
        if nb > 0 && s[nb - 1] == b'\n' {
            nb -= 1;
        }

        // First line gets the top edge, the last one the bottom edge.
        let edges = match border {
            Border::None => None,
            Border::Frame => Some(Sides { left: true, top: true, right: true, bottom: true }),
            Border::Sides(sides) => Some(sides),
        };
        let middle = edges.map(|e| Sides { left: e.left, right: e.right, ..Sides::default() });
        let mut b = edges.map(|e| Sides { top: e.top, ..middle.unwrap_or_default() });
        let as_border = |sides: Option<Sides>| match sides {
            Some(sides) if sides != Sides::default() => Border::Sides(sides),
            _ => Border::None,
        };

        let mut sep: Option<usize> = None;
        let (mut i, mut j, mut nl, mut ns) = (0usize, 0usize, 1usize, 0usize);
        let (mut l, mut ls) = (0.0f64, 0.0f64);
        while i < nb {
            let c = s[i];
            if c == b'\n' {
                self.reset_word_spacing()?;
                self.cell_bytes(w, h, &s[j..i], as_border(b), LineBreak::Below, align, fill, None)?;
                i += 1;
                sep = None;
                j = i;
                l = 0.0;
                ns = 0;
                nl += 1;
                if edges.is_some() && nl == 2 {
                    b = middle;
                }
                continue;
            }
            if c == b' ' {
                sep = Some(i);
                ls = l;
                ns += 1;
            }
            l += width(c);
            if l > wmax {
                match sep {
                    None => {
                        if i == j {
                            i += 1;
                        }
                        self.reset_word_spacing()?;
                        self.cell_bytes(w, h, &s[j..i], as_border(b), LineBreak::Below, align, fill, None)?;
                    }
                    Some(at) => {
                        if align == Align::Justify {
                            self.ws = if ns > 1 {
                                (wmax - ls) / 1000.0 * self.font_size / (ns - 1) as f64
                            } else {
                                0.0
                            };
                            self.out_str(&format!("{:.3} Tw", self.ws * self.k))?;
                        }
                        self.cell_bytes(w, h, &s[j..at], as_border(b), LineBreak::Below, align, fill, None)?;
                        i = at + 1;
                    }
                }
                sep = None;
                j = i;
                l = 0.0;
                ns = 0;
                nl += 1;
                if edges.is_some() && nl == 2 {
                    b = middle;
                }
            } else {
                i += 1;
            }
        }

        self.reset_word_spacing()?;
        if let (Some(last), Some(e)) = (b.as_mut(), edges) {
            last.bottom = e.bottom;
        }
        self.cell_bytes(w, h, &s[j..i], as_border(b), LineBreak::Below, align, fill, None)?;
        self.x = self.l_margin;
        Ok(())
    }

    fn reset_word_spacing(&mut self) -> Result<()> {
        if self.ws > 0.0 {
            self.ws = 0.0;
            self.out_str("0 Tw")?;
        }
        Ok(())
    }

    /// Flowing text from the current position. Lines wrap at the right
    /// margin and continue from the left margin; the position ends just
    /// after the last character.
    pub fn write(&mut self, h: f64, txt: &str, link: Option<LinkTarget>) -> Result<()> {
        self.ensure_page()?;
        let cw = self.current_font()?.definition.widths.clone();
        let width = |c: u8| f64::from(cw.get(c as usize).copied().unwrap_or(0));

        let mut w = self.w - self.r_margin - self.x;
        let mut wmax = (w - 2.0 * self.c_margin) * 1000.0 / self.font_size;
        let s: Vec<u8> = encode_cp1252(txt).into_iter().filter(|&c| c != b'\r').collect();
        let nb = s.len();

        let mut sep: Option<usize> = None;
        let (mut i, mut j, mut nl) = (0usize, 0usize, 1usize);
        let mut l = 0.0f64;
        while i < nb {
            let c = s[i];
            if c == b'\n' {
                self.cell_bytes(w, h, &s[j..i], Border::None, LineBreak::Below, Align::Left, false, link.clone())?;
                i += 1;
                sep = None;
                j = i;
                l = 0.0;
                if nl == 1 {
                    self.x = self.l_margin;
                    w = self.w - self.r_margin - self.x;
                    wmax = (w - 2.0 * self.c_margin) * 1000.0 / self.font_size;
                }
                nl += 1;
                continue;
            }
            if c == b' ' {
                sep = Some(i);
            }
            l += width(c);
            if l > wmax {
                match sep {
                    None => {
                        if self.x > self.l_margin {
                            // Not even one word fits: start over on the next line
                            self.x = self.l_margin;
                            self.y += h;
                            w = self.w - self.r_margin - self.x;
                            wmax = (w - 2.0 * self.c_margin) * 1000.0 / self.font_size;
                            i += 1;
                            nl += 1;
                            continue;
                        }
                        if i == j {
                            i += 1;
                        }
                        self.cell_bytes(w, h, &s[j..i], Border::None, LineBreak::Below, Align::Left, false, link.clone())?;
                    }
                    Some(at) => {
                        self.cell_bytes(w, h, &s[j..at], Border::None, LineBreak::Below, Align::Left, false, link.clone())?;
                        i = at + 1;
                    }
                }
                sep = None;
                j = i;
                l = 0.0;
                if nl == 1 {
                    self.x = self.l_margin;
                    w = self.w - self.r_margin - self.x;
                    wmax = (w - 2.0 * self.c_margin) * 1000.0 / self.font_size;
                }
                nl += 1;
            } else {
                i += 1;
            }
        }

        if i != j {
            let last_w = l / 1000.0 * self.font_size;
            self.cell_bytes(last_w, h, &s[j..], Border::None, LineBreak::Right, Align::Left, false, link)?;
        }
        Ok(())
    }

    /// Line break: back to the left margin and down by `h`, or by the
    /// height of the last cell.
    pub fn ln(&mut self, h: Option<f64>) {
        self.x = self.l_margin;
        self.y += h.unwrap_or(self.lasth);
    }
}
