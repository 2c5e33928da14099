//! Font and image objects and the shared resource dictionary (object 2).

use std::collections::HashMap;

use super::flate;
use super::writer::PdfWriter;
use crate::font::{to_unicode_cmap, FontKind, FontRegistry};
use crate::image_loader::{ColorSpace, ImageInfo, ImageRegistry};

/// Write font files, encodings, CMaps and font dictionaries.
/// Returns the font object ids in registry order.
pub fn put_fonts(w: &mut PdfWriter, fonts: &FontRegistry) -> Vec<usize> {
    // Font programs, one stream per distinct file
    let mut files: HashMap<&str, usize> = HashMap::new();
    for font in fonts.iter() {
        let Some(file) = font.definition.file() else {
            continue;
        };
        if files.contains_key(file.name.as_str()) {
            continue;
        }
        let packed = if !file.deflated && w.compress() {
            flate::deflate(&file.data)
        } else {
            None
        };
        let filtered = file.deflated || packed.is_some();
        let data = packed.as_deref().unwrap_or(&file.data);

        let id = w.new_object(None);
        files.insert(&file.name, id);
        w.out(&format!("<</Length {}", data.len()));
        if filtered {
            w.out("/Filter /FlateDecode");
        }
        w.out(&format!("/Length1 {}", file.length1));
        if let Some(length2) = file.length2 {
            w.out(&format!("/Length2 {} /Length3 0", length2));
        }
        w.out(">>");
        w.put_stream(data);
        w.end_object();
    }

    let mut encodings: HashMap<&str, usize> = HashMap::new();
    let mut cmaps: HashMap<&str, usize> = HashMap::new();
    let mut ids = Vec::with_capacity(fonts.len());
    for font in fonts.iter() {
        let def = &font.definition;
        let key = def.cmap_key();

        if let Some(diff) = &def.diff {
            if !encodings.contains_key(key) {
                let id = w.new_object(None);
                w.out(&format!(
                    "<</Type /Encoding /BaseEncoding /WinAnsiEncoding /Differences [{}]>>",
                    diff
                ));
                w.end_object();
                encodings.insert(key, id);
            }
        }

        let cmap = match &def.unicode_map {
            Some(map) => Some(match cmaps.get(key) {
                Some(&id) => id,
                None => {
                    let id = w.put_stream_object(to_unicode_cmap(map).as_bytes());
                    cmaps.insert(key, id);
                    id
                }
            }),
            None => None,
        };

        let name = def.base_font();
        let id = w.new_object(None);
        ids.push(id);
        w.out("<</Type /Font");
        w.out(&format!("/BaseFont /{}", name));
        match &def.kind {
            FontKind::Core => {
                w.out("/Subtype /Type1");
                if name != "Symbol" && name != "ZapfDingbats" {
                    w.out("/Encoding /WinAnsiEncoding");
                }
                if let Some(cmap) = cmap {
                    w.out(&format!("/ToUnicode {} 0 R", cmap));
                }
                w.out(">>");
                w.end_object();
            }
            FontKind::Type1 { .. } | FontKind::TrueType { .. } => {
                let (subtype, file_key) = match def.kind {
                    FontKind::Type1 { .. } => ("Type1", "FontFile"),
                    _ => ("TrueType", "FontFile2"),
                };
                w.out(&format!("/Subtype /{}", subtype));
                w.out("/FirstChar 32 /LastChar 255");
                w.out(&format!("/Widths {} 0 R", id + 1));
                w.out(&format!("/FontDescriptor {} 0 R", id + 2));
                match encodings.get(key).filter(|_| def.diff.is_some()) {
                    Some(enc) => w.out(&format!("/Encoding {} 0 R", enc)),
                    None => w.out("/Encoding /WinAnsiEncoding"),
                }
                if let Some(cmap) = cmap {
                    w.out(&format!("/ToUnicode {} 0 R", cmap));
                }
                w.out(">>");
                w.end_object();

                w.new_object(None);
                let widths: String = (32..=255u8)
                    .map(|c| format!("{} ", def.char_width(c)))
                    .collect();
                w.out(&format!("[{}]", widths));
                w.end_object();

                w.new_object(None);
                let mut descriptor = format!("<</Type /FontDescriptor /FontName /{}", name);
                if let Some(desc) = &def.descriptor {
                    descriptor.push(' ');
                    descriptor.push_str(&desc.to_pdf());
                }
                if let Some(file_id) = def.file().and_then(|f| files.get(f.name.as_str())) {
                    descriptor.push_str(&format!(" /{} {} 0 R", file_key, file_id));
                }
                descriptor.push_str(">>");
                w.out(&descriptor);
                w.end_object();
            }
        }
    }
    ids
}

/// Write every image XObject. Returns the image object ids in registry order.
pub fn put_images(w: &mut PdfWriter, images: &ImageRegistry) -> Vec<usize> {
    images.iter().map(|img| put_image(w, &img.info)).collect()
}

fn put_image(w: &mut PdfWriter, info: &ImageInfo) -> usize {
    let id = w.new_object(None);
    w.out("<</Type /XObject");
    w.out("/Subtype /Image");
    w.out(&format!("/Width {}", info.width));
    w.out(&format!("/Height {}", info.height));
    match &info.color_space {
        ColorSpace::Indexed { palette } => w.out(&format!(
            "/ColorSpace [/Indexed /DeviceRGB {} {} 0 R]",
            (palette.len() / 3).saturating_sub(1),
            id + 1
        )),
        cs => {
            w.out(&format!("/ColorSpace /{}", cs.name()));
            if *cs == ColorSpace::DeviceCMYK {
                w.out("/Decode [1 0 1 0 1 0 1 0]");
            }
        }
    }
    w.out(&format!("/BitsPerComponent {}", info.bits_per_component));
    if let Some(filter) = info.filter {
        w.out(&format!("/Filter /{}", filter.name()));
    }
    if let Some(dp) = &info.decode_parms {
        w.out(&format!("/DecodeParms <<{}>>", dp));
    }
    if let Some(trns) = &info.trns {
        let mask: String = trns.iter().map(|t| format!("{} {} ", t, t)).collect();
        w.out(&format!("/Mask [{}]", mask));
    }
    if info.smask.is_some() {
        w.out(&format!("/SMask {} 0 R", id + 1));
    }
    w.out(&format!("/Length {}>>", info.data.len()));
    w.put_stream(&info.data);
    w.end_object();

    if let Some(alpha) = &info.smask {
        let mask = ImageInfo {
            width: info.width,
            height: info.height,
            color_space: ColorSpace::DeviceGray,
            bits_per_component: 8,
            filter: info.filter,
            decode_parms: None,
            trns: None,
            data: alpha.clone(),
            smask: None,
        };
        put_image(w, &mask);
    }
    if let ColorSpace::Indexed { palette } = &info.color_space {
        w.put_stream_object(palette);
    }
    id
}

/// Write the resource dictionary as object 2.
pub fn put_resource_dict(
    w: &mut PdfWriter,
    fonts: &FontRegistry,
    font_ids: &[usize],
    images: &ImageRegistry,
    image_ids: &[usize],
) {
    w.new_object(Some(2));
    w.out("<<");
    w.out("/ProcSet [/PDF /Text /ImageB /ImageC /ImageI]");
    w.out("/Font <<");
    for (font, id) in fonts.iter().zip(font_ids) {
        w.out(&format!("/F{} {} 0 R", font.index, id));
    }
    w.out(">>");
    w.out("/XObject <<");
    for (img, id) in images.iter().zip(image_ids) {
        w.out(&format!("/I{} {} 0 R", img.index, id));
    }
    w.out(">>");
    w.out(">>");
    w.end_object();
}
