//! Integration tests for the folio document pipeline.
//!
//! These tests build documents through the public API and the JSON script
//! renderer, then read the bytes back with an independent parser. They verify:
//! - the xref table points at every object and the trailer is consistent
//! - page trees, link annotations and page-count aliases
//! - PNG alpha planes and TrueType subsets survive serialization

use folio::{
    Align, Border, Color, Destination, Document, DocumentOptions, LineBreak, Orientation, PageSize, RectStyle, Unit,
};
use lopdf::Object;
use pretty_assertions::assert_eq;

// ─── Helpers ────────────────────────────────────────────────────

fn options() -> DocumentOptions {
    DocumentOptions {
        unit: Unit::Pt,
        compress: false,
        ..DocumentOptions::default()
    }
}

fn load(pdf: &[u8]) -> lopdf::Document {
    lopdf::Document::load_mem(pdf).expect("generated PDF should parse")
}

fn stream_data(stream: &lopdf::Stream) -> Vec<u8> {
    match stream.dict.get(b"Filter") {
        Ok(_) => miniz_oxide::inflate::decompress_to_vec_zlib(&stream.content).expect("valid zlib stream"),
        Err(_) => stream.content.clone(),
    }
}

/// Check every xref entry against the bytes it points at. Returns the
/// number of in-use entries.
fn check_xref(pdf: &[u8]) -> usize {
    let marker = b"startxref\n";
    let at = pdf
        .windows(marker.len())
        .rposition(|w| w == marker)
        .expect("startxref present");
    let tail = std::str::from_utf8(&pdf[at + marker.len()..]).unwrap();
    let xref: usize = tail.lines().next().unwrap().parse().unwrap();

    let table = std::str::from_utf8(&pdf[xref..]).unwrap();
    let mut lines = table.lines();
    assert_eq!(lines.next(), Some("xref"));
    let count: usize = lines.next().unwrap().split(' ').nth(1).unwrap().parse().unwrap();
    assert_eq!(lines.next(), Some("0000000000 65535 f "));
    for id in 1..count {
        let entry = lines.next().unwrap();
        assert!(entry.ends_with(" 00000 n "), "bad entry {:?}", entry);
        let offset: usize = entry[..10].parse().unwrap();
        let expected = format!("{} 0 obj", id);
        assert!(
            pdf[offset..].starts_with(expected.as_bytes()),
            "xref entry {} points at {:?}",
            id,
            String::from_utf8_lossy(&pdf[offset..offset + 12])
        );
    }
    count - 1
}

fn rgba_png(width: u32, height: u32) -> Vec<u8> {
    use image::codecs::png::PngEncoder;
    use image::{ColorType, ImageEncoder};

    let raw: Vec<u8> = (0..width * height)
        .flat_map(|i| [i as u8, 255 - i as u8, 7, (i * 2) as u8])
        .collect();
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(&raw, width, height, ColorType::Rgba8)
        .unwrap();
    out
}

// ─── Structure ──────────────────────────────────────────────────

#[test]
fn test_blank_a4_page() {
    let pdf = Document::new(DocumentOptions::default()).unwrap().finish().unwrap();
    assert!(pdf.starts_with(b"%PDF-1.3\n%\xe2\xe3\xcf\xd3\n"));
    let objects = check_xref(&pdf);

    let doc = load(&pdf);
    assert_eq!(doc.get_pages().len(), 1);
    assert_eq!(doc.max_id as usize, objects);
    let size = doc.trailer.get(b"Size").unwrap().as_i64().unwrap();
    assert_eq!(size as usize, objects + 1);

    let root = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    assert_eq!(root.0 as usize, objects);
    let catalog = doc.get_object(root).unwrap().as_dict().unwrap();
    assert_eq!(catalog.get(b"Pages").unwrap().as_reference().unwrap(), (1, 0));
    let pages = doc.get_object((1, 0)).unwrap().as_dict().unwrap();
    assert_eq!(pages.get(b"Kids").unwrap().as_array().unwrap().len(), 1);
}

#[test]
fn test_full_document_xref_and_contents() {
    let mut doc = Document::new(options()).unwrap();
    doc.set_title("Quarterly report");
    doc.set_author("Zoë");
    doc.alias_nb_pages("{nb}");
    doc.set_footer(|d| {
        d.set_y(-30.0, true);
        d.set_font("helvetica", "I", 8.0)?;
        let label = format!("Page {}/{{nb}}", d.page_no());
        d.cell(0.0, 10.0, &label, Border::None, LineBreak::Right, Align::Center, false, None)
    });

    let back = doc.add_link();
    doc.add_page().unwrap();
    doc.set_link(back, -1.0, None).unwrap();
    doc.set_font("times", "", 12.0).unwrap_err();
    doc.set_font("courier", "", 12.0).unwrap();
    doc.set_fill_color(Color::Rgb(220, 220, 255)).unwrap();
    for i in 0..80 {
        let text = format!("Row {}", i);
        doc.cell(0.0, 14.0, &text, Border::Frame, LineBreak::NextLine, Align::Left, i % 2 == 0, None)
            .unwrap();
    }
    doc.add_page_with(Some(Orientation::Landscape), Some(PageSize::Letter), 90)
        .unwrap();
    doc.rect(100.0, 100.0, 50.0, 50.0, RectStyle::DrawFill).unwrap();
    doc.cell(60.0, 14.0, "Back to start", Border::None, LineBreak::Right, Align::Left, false, Some(back.into()))
        .unwrap();
    let pdf = doc.output(Destination::Memory).unwrap();

    check_xref(&pdf);
    let parsed = load(&pdf);
    let pages = parsed.get_pages();
    assert_eq!(pages.len(), 3);

    let first = String::from_utf8_lossy(&parsed.get_page_content(pages[&1]).unwrap()).into_owned();
    assert!(first.contains("(Row 0) Tj"));
    assert!(first.contains("(Page 1/3) Tj"));
    let last = String::from_utf8_lossy(&parsed.get_page_content(pages[&3]).unwrap()).into_owned();
    assert!(last.contains("(Page 3/3) Tj"));

    let last_page = parsed.get_object(pages[&3]).unwrap().as_dict().unwrap();
    assert_eq!(last_page.get(b"Rotate").unwrap().as_i64().unwrap(), 90);
    let media_box = last_page.get(b"MediaBox").unwrap().as_array().unwrap();
    assert_eq!(media_box[2].as_float().unwrap(), 792.0);
    let annots = last_page.get(b"Annots").unwrap().as_array().unwrap();
    let annot = annots[0].as_dict().unwrap();
    let dest = annot.get(b"Dest").unwrap().as_array().unwrap();
    assert_eq!(dest[0].as_reference().unwrap(), pages[&1]);

    let info_id = parsed.trailer.get(b"Info").unwrap().as_reference().unwrap();
    let info = parsed.get_object(info_id).unwrap().as_dict().unwrap();
    match info.get(b"Author").unwrap() {
        Object::String(bytes, _) => assert_eq!(&bytes[..2], &[0xFE, 0xFF]),
        other => panic!("unexpected author {:?}", other),
    }
}

#[test]
fn test_output_to_file() {
    let path = std::env::temp_dir().join(format!("folio-output-{}.pdf", std::process::id()));
    let mut doc = Document::new(options()).unwrap();
    doc.add_page().unwrap();
    doc.line(0.0, 0.0, 100.0, 100.0).unwrap();
    let bytes = doc.output(Destination::File(path.clone())).unwrap();
    let written = std::fs::read(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(written, bytes);
}

// ─── Images ─────────────────────────────────────────────────────

#[cfg(feature = "deflate")]
#[test]
fn test_rgba_png_becomes_image_and_soft_mask() {
    let png = rgba_png(10, 10);
    let mut doc = Document::new(options()).unwrap();
    doc.add_page().unwrap();
    doc.image(&png, Some(10.0), Some(10.0), 100.0, 0.0, None).unwrap();
    let pdf = doc.finish().unwrap();
    assert!(pdf.starts_with(b"%PDF-1.4\n"));
    check_xref(&pdf);

    let parsed = load(&pdf);
    let (color, alpha) = parsed
        .objects
        .values()
        .find_map(|obj| match obj {
            Object::Stream(s) if s.dict.has(b"SMask") => {
                let mask_id = s.dict.get(b"SMask").unwrap().as_reference().unwrap();
                match parsed.get_object(mask_id).unwrap() {
                    Object::Stream(mask) => Some((stream_data(s), stream_data(mask))),
                    _ => None,
                }
            }
            _ => None,
        })
        .expect("image with a soft mask");
    assert_eq!(color.len(), 300);
    assert_eq!(alpha.len(), 100);
    assert_eq!(&color[..6], &[0, 255, 7, 1, 254, 7]);
    assert_eq!(&alpha[..3], &[0, 2, 4]);

    let page = parsed.get_object(parsed.get_pages()[&1]).unwrap().as_dict().unwrap();
    assert!(page.has(b"Group"));
}

// ─── Scripts ────────────────────────────────────────────────────

#[test]
fn test_json_script_renders() {
    let json = r##"{
        "options": {"orientation": "portrait", "unit": "mm", "size": "A5",
                    "displayMode": {"zoom": 150, "layout": "continuous"}},
        "pages": [
            {"ops": [
                {"op": "setFont", "family": "arial", "size": 11},
                {"op": "multiCell", "w": 0, "h": 5, "text": "A paragraph long enough to wrap across the width of an A5 page more than once, justified."},
                {"op": "setDrawColor", "color": [255, 0, 0]},
                {"op": "line", "x1": 10, "y1": 100, "x2": 138, "y2": 100}
            ]},
            {"size": {"width": 100, "height": 50}, "ops": []}
        ]
    }"##;
    let pdf = folio::render_json(json).unwrap();
    check_xref(&pdf);
    let parsed = load(&pdf);
    assert_eq!(parsed.get_pages().len(), 2);

    let root = parsed.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = parsed.get_object(root).unwrap().as_dict().unwrap();
    assert_eq!(catalog.get(b"PageLayout").unwrap().as_name().unwrap(), b"OneColumn");
    let action = catalog.get(b"OpenAction").unwrap().as_array().unwrap();
    assert_eq!(action[1].as_name().unwrap(), b"XYZ");
    assert_eq!(action[4].as_float().unwrap(), 1.5);
}

#[test]
fn test_bad_script_reports_hint() {
    let err = folio::render_json(r#"{"pages": [{"ops": [{"op": "cell", "border": 7}]}]}"#).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Failed to parse document"), "{}", message);
    assert!(message.contains("Hint"));
}
