//! Colors, lines, rectangles and images.

use super::{Color, Document, RectStyle, State};
use crate::error::Result;
use crate::image_loader::{ImageFormat, ImageSource};
use crate::pdf::pages::LinkTarget;

impl Document {
    /// Color for lines, rectangle outlines and cell borders.
    pub fn set_draw_color(&mut self, color: Color) -> Result<()> {
        self.ensure_not_closed()?;
        self.draw_color = color.operator("G", "RG");
        if self.state == State::PageOpen {
            let op = self.draw_color.clone();
            self.out_str(&op)?;
        }
        Ok(())
    }

    /// Color for filled shapes and cell backgrounds.
    pub fn set_fill_color(&mut self, color: Color) -> Result<()> {
        self.ensure_not_closed()?;
        self.fill_color = color.operator("g", "rg");
        self.color_flag = self.fill_color != self.text_color;
        if self.state == State::PageOpen {
            let op = self.fill_color.clone();
            self.out_str(&op)?;
        }
        Ok(())
    }

    /// Text color. Applied per text run, so nothing is written here.
    pub fn set_text_color(&mut self, color: Color) -> Result<()> {
        self.ensure_not_closed()?;
        self.text_color = color.operator("g", "rg");
        self.color_flag = self.fill_color != self.text_color;
        Ok(())
    }

    pub fn set_line_width(&mut self, width: f64) -> Result<()> {
        self.ensure_not_closed()?;
        self.line_width = width;
        if self.state == State::PageOpen {
            self.out_str(&format!("{:.2} w", width * self.k))?;
        }
        Ok(())
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        let (k, h) = (self.k, self.h);
        self.out_str(&format!(
            "{:.2} {:.2} m {:.2} {:.2} l S",
            x1 * k,
            (h - y1) * k,
            x2 * k,
            (h - y2) * k
        ))
    }

    pub fn rect(&mut self, x: f64, y: f64, w: f64, h: f64, style: RectStyle) -> Result<()> {
        let k = self.k;
        self.out_str(&format!(
            "{:.2} {:.2} {:.2} {:.2} re {}",
            x * k,
            (self.h - y) * k,
            w * k,
            -h * k,
            style.operator()
        ))
    }

    /// Place an image. The format comes from the source's extension or MIME
    /// type, else from its magic bytes.
    ///
    /// `w` and `h` are user units when positive and a resolution in dpi
    /// when negative. When both are 0 the image is placed at 96 dpi; when
    /// one is 0 it keeps the aspect ratio. Without `y` the image flows:
    /// it goes at the current ordinate, which then moves below it, with a
    /// page break first if it does not fit.
    #[allow(clippy::too_many_arguments)]
    pub fn image<'a>(
        &mut self,
        source: impl Into<ImageSource<'a>>,
        x: Option<f64>,
        y: Option<f64>,
        w: f64,
        h: f64,
        link: Option<LinkTarget>,
    ) -> Result<()> {
        self.place_image(source.into(), None, x, y, w, h, link)
    }

    /// [`Document::image`] with an explicit format.
    #[allow(clippy::too_many_arguments)]
    pub fn image_with_type<'a>(
        &mut self,
        source: impl Into<ImageSource<'a>>,
        format: ImageFormat,
        x: Option<f64>,
        y: Option<f64>,
        w: f64,
        h: f64,
        link: Option<LinkTarget>,
    ) -> Result<()> {
        self.place_image(source.into(), Some(format), x, y, w, h, link)
    }

    #[allow(clippy::too_many_arguments)]
    fn place_image(
        &mut self,
        source: ImageSource<'_>,
        format: Option<ImageFormat>,
        x: Option<f64>,
        y: Option<f64>,
        w: f64,
        h: f64,
        link: Option<LinkTarget>,
    ) -> Result<()> {
        self.ensure_page()?;
        let (index, iw, ih) = {
            let image = self.images.load(source, format)?;
            (image.index, f64::from(image.info.width), f64::from(image.info.height))
        };

        let (mut w, mut h) = if w == 0.0 && h == 0.0 { (-96.0, -96.0) } else { (w, h) };
        if w < 0.0 {
            w = -iw * 72.0 / w / self.k;
        }
        if h < 0.0 {
            h = -ih * 72.0 / h / self.k;
        }
        if w == 0.0 {
            w = h * iw / ih;
        }
        if h == 0.0 {
            h = w * ih / iw;
        }

        let y = match y {
            Some(y) => y,
            None => {
                if self.needs_break(h) {
                    self.page_break()?;
                }
                let y = self.y;
                self.y += h;
                y
            }
        };
        let x = x.unwrap_or(self.x);

        let k = self.k;
        self.out_str(&format!(
            "q {:.2} 0 0 {:.2} {:.2} {:.2} cm /I{} Do Q",
            w * k,
            h * k,
            x * k,
            (self.h - (y + h)) * k,
            index
        ))?;
        if let Some(link) = link {
            self.link(x, y, w, h, link)?;
        }
        Ok(())
    }
}
