//! Turns a TrueType file into a single-byte font definition.
//!
//! The 256 codes of the font follow cp1252. Widths, the descriptor and the
//! underline metrics are scaled to thousandths of an em. When subsetting is
//! on, the embedded program keeps only the glyphs cp1252 can reach.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use log::debug;
use serde::{Deserialize, Serialize};

use super::truetype::TrueTypeFont;
use super::{cp1252_unicode_map, FontDefinition, FontDescriptor, FontFile, FontKind};
use crate::encoding::cp1252_to_unicode;
use crate::error::{FolioError, Result};
use crate::pdf::flate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedOptions {
    /// Embed only the glyphs reachable from cp1252.
    pub subset: bool,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        EmbedOptions { subset: true }
    }
}

/// Characters with a glyph name in cp1252: everything from the space up,
/// except DEL and the five unassigned codes.
pub fn cp1252_repertoire() -> impl Iterator<Item = (u8, char)> {
    (0x20..=0xFFu8)
        .filter(|&code| code != 0x7F)
        .filter_map(|code| cp1252_to_unicode(code).map(|c| (code, c)))
}

/// Parse `data` and build a definition that embeds it.
pub fn truetype_definition(data: &[u8], options: &EmbedOptions) -> Result<FontDefinition> {
    let font = TrueTypeFont::from_bytes(data)?;
    if !font.os2.embeddable {
        return Err(FolioError::format("Font license does not allow embedding"));
    }

    let upem = f64::from(font.head.units_per_em);
    let scale = |v: f64| (v * 1000.0 / upem).round() as i32;

    let missing_width = scale(f64::from(font.glyphs[0].advance)).max(0) as u16;
    let mut widths = vec![missing_width; 256];
    for (code, c) in cp1252_repertoire() {
        if let Some(gid) = font.glyph_id(c) {
            widths[code as usize] = scale(f64::from(font.glyphs[gid as usize].advance)).max(0) as u16;
        }
    }

    let ascent = scale(f64::from(font.os2.typo_ascender));
    let cap_height = match scale(f64::from(font.os2.cap_height)) {
        0 => ascent,
        cap => cap,
    };
    let mut flags = 1 << 5;
    if font.post.is_fixed_pitch {
        flags += 1;
    }
    if font.post.italic_angle != 0 {
        flags += 1 << 6;
    }
    let head = &font.head;
    let descriptor = FontDescriptor {
        ascent,
        descent: scale(f64::from(font.os2.typo_descender)),
        cap_height,
        flags,
        font_bbox: [
            scale(f64::from(head.x_min)),
            scale(f64::from(head.y_min)),
            scale(f64::from(head.x_max)),
            scale(f64::from(head.y_max)),
        ],
        italic_angle: f64::from(font.post.italic_angle),
        stem_v: if font.os2.bold { 120 } else { 70 },
        missing_width,
    };

    let program = if options.subset {
        font.subset(cp1252_repertoire().map(|(_, c)| c)).build()
    } else {
        data.to_vec()
    };
    let length1 = program.len();
    let file_name = format!("{}-{:016x}", font.postscript_name, content_hash(&program));
    let (data, deflated) = match flate::deflate(&program) {
        Some(compressed) => (compressed, true),
        None => (program, false),
    };
    debug!(
        "Prepared TrueType font {} ({} bytes{})",
        font.postscript_name,
        length1,
        if options.subset { ", subset" } else { "" }
    );

    Ok(FontDefinition {
        name: font.postscript_name.clone(),
        kind: FontKind::TrueType {
            file: Some(FontFile {
                name: file_name,
                data,
                deflated,
                length1,
                length2: None,
            }),
        },
        widths,
        underline_position: scale(f64::from(font.post.underline_position)),
        underline_thickness: scale(f64::from(font.post.underline_thickness)),
        descriptor: Some(descriptor),
        diff: None,
        encoding: Some("cp1252".to_string()),
        unicode_map: Some(cp1252_unicode_map()),
        subsetted: options.subset,
    })
}

fn content_hash(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}
