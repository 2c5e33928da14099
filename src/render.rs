//! Replays a [`DocumentSpec`] script against a [`Document`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{Document, LinkId, LinkTarget};
use crate::error::{FolioError, Result};
use crate::font::EmbedOptions;
use crate::image_loader::ImageFormat;
use crate::model::{DocumentSpec, Op};

type LinkNames = HashMap<String, LinkId>;

/// Render a script. Relative font, font directory and image paths are
/// resolved against `base_dir`.
pub fn render(spec: &DocumentSpec, base_dir: &Path) -> Result<Vec<u8>> {
    let mut options = spec.options.clone();
    if let Some(dir) = options.font_path.take() {
        options.font_path = Some(base_dir.join(dir));
    }
    let mut doc = Document::new(options)?;

    for font in &spec.fonts {
        match &font.src {
            Some(src) => {
                let data = fs::read(base_dir.join(src))?;
                let options = EmbedOptions { subset: font.subset };
                doc.add_truetype_font(&font.family, &font.style, &data, &options)?;
            }
            None => doc.add_font(&font.family, &font.style)?,
        }
    }

    let links = declare_links(&mut doc, spec);
    if !spec.header.is_empty() {
        doc.set_header(hook(spec.header.clone(), links.clone(), base_dir.to_path_buf()));
    }
    if !spec.footer.is_empty() {
        doc.set_footer(hook(spec.footer.clone(), links.clone(), base_dir.to_path_buf()));
    }

    for page in &spec.pages {
        doc.add_page_with(page.orientation, page.size, page.rotation)?;
        for op in &page.ops {
            apply(&mut doc, op, &links, base_dir)?;
        }
    }
    doc.finish()
}

/// Parse a JSON script and render it relative to the working directory.
pub fn render_json(json: &str) -> Result<Vec<u8>> {
    let spec: DocumentSpec = serde_json::from_str(json)?;
    render(&spec, Path::new("."))
}

fn hook(ops: Vec<Op>, links: LinkNames, base_dir: PathBuf) -> impl FnMut(&mut Document) -> Result<()> {
    move |doc: &mut Document| {
        for op in &ops {
            if matches!(op, Op::AddPage { .. }) {
                return Err(FolioError::config("addPage is not allowed in a header or footer"));
            }
            apply(doc, op, &links, &base_dir)?;
        }
        Ok(())
    }
}

/// Create one link for every `#name` the script mentions, so headers and
/// footers can point at destinations set later.
fn declare_links(doc: &mut Document, spec: &DocumentSpec) -> LinkNames {
    let mut names = LinkNames::new();
    let ops = spec
        .header
        .iter()
        .chain(&spec.footer)
        .chain(spec.pages.iter().flat_map(|p| &p.ops));
    for op in ops {
        let name = match op {
            Op::Cell { link: Some(link), .. }
            | Op::Write { link: Some(link), .. }
            | Op::Image { link: Some(link), .. }
            | Op::Link { link, .. } => link.strip_prefix('#'),
            Op::SetLink { name, .. } => Some(name.as_str()),
            _ => None,
        };
        if let Some(name) = name {
            if !names.contains_key(name) {
                names.insert(name.to_string(), doc.add_link());
            }
        }
    }
    names
}

fn link_target(link: &str, links: &LinkNames) -> Result<LinkTarget> {
    match link.strip_prefix('#') {
        Some(name) => links
            .get(name)
            .map(|&id| LinkTarget::Internal(id))
            .ok_or_else(|| FolioError::config(format!("Unknown link: {}", link))),
        None => Ok(LinkTarget::Uri(link.to_string())),
    }
}

fn optional_target(link: &Option<String>, links: &LinkNames) -> Result<Option<LinkTarget>> {
    link.as_deref().map(|l| link_target(l, links)).transpose()
}

fn apply(doc: &mut Document, op: &Op, links: &LinkNames, base_dir: &Path) -> Result<()> {
    match op {
        Op::AddPage { orientation, size, rotation } => doc.add_page_with(*orientation, *size, *rotation),
        Op::SetFont { family, style, size } => doc.set_font(family, style, *size),
        Op::SetFontSize { size } => doc.set_font_size(*size),
        Op::SetDrawColor { color } => doc.set_draw_color(*color),
        Op::SetFillColor { color } => doc.set_fill_color(*color),
        Op::SetTextColor { color } => doc.set_text_color(*color),
        Op::SetLineWidth { width } => doc.set_line_width(*width),
        Op::Line { x1, y1, x2, y2 } => doc.line(*x1, *y1, *x2, *y2),
        Op::Rect { x, y, w, h, style } => doc.rect(*x, *y, *w, *h, *style),
        Op::Text { x, y, text } => doc.text(*x, *y, text),
        Op::Cell { w, h, text, border, ln, align, fill, link } => {
            let link = optional_target(link, links)?;
            doc.cell(*w, *h, text, *border, *ln, *align, *fill, link)
        }
        Op::MultiCell { w, h, text, border, align, fill } => doc.multi_cell(*w, *h, text, *border, *align, *fill),
        Op::Write { h, text, link } => {
            let link = optional_target(link, links)?;
            doc.write(*h, text, link)
        }
        Op::Ln { h } => {
            doc.ln(*h);
            Ok(())
        }
        Op::Image { src, x, y, w, h, format, link } => {
            let link = optional_target(link, links)?;
            let path = base_dir.join(src);
            let src = if path.is_file() { path.to_string_lossy().into_owned() } else { src.clone() };
            match format {
                Some(name) => {
                    let format = ImageFormat::from_name(name)?;
                    doc.image_with_type(src.as_str(), format, *x, *y, *w, *h, link)
                }
                None => doc.image(src.as_str(), *x, *y, *w, *h, link),
            }
        }
        Op::Link { x, y, w, h, link } => {
            let target = link_target(link, links)?;
            doc.link(*x, *y, *w, *h, target)
        }
        Op::SetLink { name, y, page } => {
            let id = links
                .get(name)
                .copied()
                .ok_or_else(|| FolioError::config(format!("Unknown link: #{}", name)))?;
            doc.set_link(id, *y, *page)
        }
        Op::SetX { x } => {
            doc.set_x(*x);
            Ok(())
        }
        Op::SetY { y, reset_x } => {
            doc.set_y(*y, *reset_x);
            Ok(())
        }
        Op::SetXY { x, y } => {
            doc.set_xy(*x, *y);
            Ok(())
        }
        Op::SetMargins { left, top, right } => {
            doc.set_margins(*left, *top, *right);
            Ok(())
        }
        Op::SetLeftMargin { margin } => {
            doc.set_left_margin(*margin);
            Ok(())
        }
        Op::SetTopMargin { margin } => {
            doc.set_top_margin(*margin);
            Ok(())
        }
        Op::SetRightMargin { margin } => {
            doc.set_right_margin(*margin);
            Ok(())
        }
        Op::SetAutoPageBreak { enabled, margin } => {
            doc.set_auto_page_break(*enabled, *margin);
            Ok(())
        }
    }
}
