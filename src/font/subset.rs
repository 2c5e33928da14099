//! # TrueType Font Subsetter
//!
//! Strips a parsed TrueType font down to the glyphs a character set needs
//! and rebuilds a valid sfnt from them. Glyph ids are renumbered densely in
//! the order the closure walk first reaches them, starting with `.notdef`.
//!
//! ## Approach
//!
//! 1. Walk glyph 0 and every mapped requested character depth-first through
//!    composite references (explicit stack, visited map by original id)
//! 2. Rebuild cmap, hhea, hmtx, loca, glyf, maxp and post for the new ids
//! 3. Copy hinting tables and `name` verbatim
//! 4. Assemble in canonical tag order with fresh checksums and patch
//!    `head.checkSumAdjustment`

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use super::reader::Tag;
use super::truetype::{GlyphName, TrueTypeFont};

/// Tables in the order they are written. Anything else is dropped.
const TABLE_ORDER: [Tag; 12] = [
    *b"cmap", *b"cvt ", *b"fpgm", *b"glyf", *b"head", *b"hhea",
    *b"hmtx", *b"loca", *b"maxp", *b"name", *b"post", *b"prep",
];

const CHECKSUM_MAGIC: u32 = 0xB1B0AFBA;

/// Number of glyph names in the standard Macintosh order.
const STANDARD_NAMES: u16 = 258;

/// A glyph closure over a parsed font, ready to be rebuilt.
pub struct Subset<'a> {
    font: &'a TrueTypeFont,
    /// Original glyph ids in subset order.
    glyphs: Vec<u16>,
    /// Original glyph id to subset id.
    ssid: HashMap<u16, u16>,
    /// Requested codepoints present in the font's cmap.
    chars: BTreeSet<u16>,
}

impl TrueTypeFont {
    /// Compute the glyph closure for `chars`. Characters the font does not
    /// map are skipped.
    pub fn subset<I: IntoIterator<Item = char>>(&self, chars: I) -> Subset<'_> {
        let mut subset = Subset {
            font: self,
            glyphs: Vec::new(),
            ssid: HashMap::new(),
            chars: BTreeSet::new(),
        };
        subset.add_glyph(0);
        for c in chars {
            let Ok(code) = u16::try_from(c as u32) else {
                continue;
            };
            if let Some(&gid) = self.chars.get(&code) {
                subset.chars.insert(code);
                subset.add_glyph(gid);
            }
        }
        subset
    }
}

impl<'a> Subset<'a> {
    fn add_glyph(&mut self, root: u16) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if self.ssid.contains_key(&id) {
                continue;
            }
            self.ssid.insert(id, self.glyphs.len() as u16);
            self.glyphs.push(id);
            // Reversed so the first component is visited first
            for component in self.font.glyphs[id as usize].components.iter().rev() {
                stack.push(component.glyph);
            }
        }
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Original glyph ids in subset order.
    pub fn glyph_ids(&self) -> &[u16] {
        &self.glyphs
    }

    pub fn subset_id(&self, original: u16) -> Option<u16> {
        self.ssid.get(&original).copied()
    }

    /// Mapped codepoints carried into the rebuilt cmap.
    pub fn chars(&self) -> impl Iterator<Item = u16> + '_ {
        self.chars.iter().copied()
    }

    /// Rebuild every table and serialize the subset font.
    pub fn build(&self) -> Vec<u8> {
        let font = self.font;
        let mut tables: BTreeMap<Tag, Vec<u8>> = BTreeMap::new();

        tables.insert(*b"cmap", self.build_cmap());

        let mut hhea = font.hhea.clone();
        hhea.number_of_h_metrics = self.glyphs.len() as u16;
        tables.insert(*b"hhea", hhea.to_bytes());

        tables.insert(*b"hmtx", self.build_hmtx());
        let (glyf, loca) = self.build_glyf_and_loca();
        tables.insert(*b"glyf", glyf);
        tables.insert(*b"loca", loca);

        let mut maxp = font.maxp.clone();
        maxp.num_glyphs = self.glyphs.len() as u16;
        tables.insert(*b"maxp", maxp.to_bytes());

        tables.insert(*b"post", self.build_post());
        tables.insert(*b"head", font.head.to_bytes());

        for (tag, data) in &font.passthrough {
            tables.insert(*tag, data.clone());
        }

        debug!(
            "Subset {}: {} of {} glyphs for {} chars",
            font.postscript_name,
            self.glyphs.len(),
            font.num_glyphs(),
            self.chars.len()
        );
        assemble(&tables)
    }

    // ─── cmap ───────────────────────────────────────────────────

    fn build_cmap(&self) -> Vec<u8> {
        // Contiguous runs of mapped codepoints, then the required sentinel
        let mut segments: Vec<(u16, u16)> = Vec::new();
        for &c in &self.chars {
            match segments.last_mut() {
                Some(last) if u32::from(c) == u32::from(last.1) + 1 => last.1 = c,
                _ => segments.push((c, c)),
            }
        }
        segments.push((0xFFFF, 0xFFFF));
        let seg_count = segments.len();

        let mut end_count = Vec::with_capacity(seg_count);
        let mut start_count = Vec::with_capacity(seg_count);
        let mut id_delta = Vec::with_capacity(seg_count);
        let mut id_range_offset = Vec::with_capacity(seg_count);
        let mut glyph_id_array: Vec<u8> = Vec::new();

        for (i, &(start, end)) in segments.iter().enumerate() {
            start_count.push(start);
            end_count.push(end);
            if start != end {
                id_delta.push(0u16);
                id_range_offset.push((glyph_id_array.len() + (seg_count - i) * 2) as u16);
                for c in start..=end {
                    glyph_id_array.extend_from_slice(&self.char_ssid(c).to_be_bytes());
                }
            } else {
                let ssid = if start < 0xFFFF { self.char_ssid(start) } else { 0 };
                id_delta.push(ssid.wrapping_sub(start));
                id_range_offset.push(0);
            }
        }

        let entry_selector = floor_log2(seg_count);
        let search_range = (1u16 << entry_selector) * 2;
        let range_shift = 2 * seg_count as u16 - search_range;

        let mut sub = Vec::new();
        write_u16(&mut sub, 2 * seg_count as u16);
        write_u16(&mut sub, search_range);
        write_u16(&mut sub, entry_selector);
        write_u16(&mut sub, range_shift);
        end_count.iter().for_each(|&v| write_u16(&mut sub, v));
        write_u16(&mut sub, 0); // reservedPad
        start_count.iter().for_each(|&v| write_u16(&mut sub, v));
        id_delta.iter().for_each(|&v| write_u16(&mut sub, v));
        id_range_offset.iter().for_each(|&v| write_u16(&mut sub, v));
        sub.extend_from_slice(&glyph_id_array);

        let mut data = Vec::with_capacity(sub.len() + 18);
        write_u16(&mut data, 0); // version
        write_u16(&mut data, 1); // numTables
        write_u16(&mut data, 3); // platformID
        write_u16(&mut data, 1); // encodingID
        write_u32(&mut data, 12);
        write_u16(&mut data, 4); // format
        write_u16(&mut data, 6 + sub.len() as u16);
        write_u16(&mut data, 0); // language
        data.extend_from_slice(&sub);
        data
    }

    fn char_ssid(&self, c: u16) -> u16 {
        self.font
            .chars
            .get(&c)
            .and_then(|gid| self.ssid.get(gid))
            .copied()
            .unwrap_or(0)
    }

    // ─── Metrics and Outlines ───────────────────────────────────

    fn build_hmtx(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.glyphs.len() * 4);
        for &id in &self.glyphs {
            let glyph = &self.font.glyphs[id as usize];
            write_u16(&mut data, glyph.advance);
            data.extend_from_slice(&glyph.lsb.to_be_bytes());
        }
        data
    }

    fn build_glyf_and_loca(&self) -> (Vec<u8>, Vec<u8>) {
        let short = self.font.head.index_to_loc_format == 0;
        let mut glyf = Vec::new();
        let mut loca = Vec::with_capacity((self.glyphs.len() + 1) * if short { 2 } else { 4 });
        let mut push_offset = |loca: &mut Vec<u8>, offset: usize| {
            if short {
                debug_assert!(offset % 2 == 0, "short loca needs even glyph offsets");
                write_u16(loca, (offset / 2) as u16);
            } else {
                write_u32(loca, offset as u32);
            }
        };

        for &id in &self.glyphs {
            push_offset(&mut loca, glyf.len());
            let start = glyf.len();
            glyf.extend_from_slice(self.font.glyph_data(id));
            for component in &self.font.glyphs[id as usize].components {
                let ssid = self.ssid.get(&component.glyph).copied().unwrap_or(0);
                let pos = start + component.offset;
                glyf[pos..pos + 2].copy_from_slice(&ssid.to_be_bytes());
            }
        }
        push_offset(&mut loca, glyf.len());
        (glyf, loca)
    }

    fn build_post(&self) -> Vec<u8> {
        let post = &self.font.post;
        let mut data = Vec::new();
        if post.glyph_names {
            write_u32(&mut data, 0x0002_0000);
            data.extend_from_slice(&post.metrics);
            write_u16(&mut data, self.glyphs.len() as u16);
            let mut names: Vec<u8> = Vec::new();
            let mut num_names = 0u16;
            for &id in &self.glyphs {
                match &self.font.glyphs[id as usize].name {
                    Some(GlyphName::Custom(name)) => {
                        write_u16(&mut data, STANDARD_NAMES + num_names);
                        let bytes = &name.as_bytes()[..name.len().min(255)];
                        names.push(bytes.len() as u8);
                        names.extend_from_slice(bytes);
                        num_names += 1;
                    }
                    Some(GlyphName::Standard(index)) => write_u16(&mut data, *index),
                    None => write_u16(&mut data, 0),
                }
            }
            data.extend_from_slice(&names);
        } else {
            write_u32(&mut data, 0x0003_0000);
            data.extend_from_slice(&post.metrics);
        }
        data
    }
}

// ─── TrueType File Writer ───────────────────────────────────────

fn assemble(tables: &BTreeMap<Tag, Vec<u8>>) -> Vec<u8> {
    let present: Vec<(&Tag, &Vec<u8>)> = TABLE_ORDER
        .iter()
        .filter_map(|tag| tables.get(tag).map(|data| (tag, data)))
        .collect();
    let num_tables = present.len();
    let entry_selector = floor_log2(num_tables);
    let search_range = 16 * (1u16 << entry_selector);
    let range_shift = 16 * num_tables as u16 - search_range;

    let mut output: Vec<u8> = Vec::new();
    write_u32(&mut output, 0x0001_0000); // sfnt version
    write_u16(&mut output, num_tables as u16);
    write_u16(&mut output, search_range);
    write_u16(&mut output, entry_selector);
    write_u16(&mut output, range_shift);

    let mut offset = 12 + 16 * num_tables;
    let mut head_offset = None;
    for (tag, data) in &present {
        if **tag == *b"head" {
            head_offset = Some(offset);
        }
        output.extend_from_slice(*tag);
        write_u32(&mut output, checksum(data));
        write_u32(&mut output, offset as u32);
        write_u32(&mut output, data.len() as u32);
        offset += padded_len(data.len());
    }

    for (_, data) in &present {
        output.extend_from_slice(data);
        output.resize(padded_len(output.len()), 0);
    }

    if let Some(pos) = head_offset {
        let adjustment = CHECKSUM_MAGIC.wrapping_sub(checksum(&output));
        output[pos + 8..pos + 12].copy_from_slice(&adjustment.to_be_bytes());
    }
    output
}

/// Table checksum: the sum of big-endian u32 words modulo 2^32, with the
/// tail zero-padded. Summing the high and low halves separately with carry
/// gives the same value.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

fn floor_log2(n: usize) -> u16 {
    debug_assert!(n > 0);
    (usize::BITS - 1 - n.leading_zeros()) as u16
}

// ─── Byte Helpers ───────────────────────────────────────────────

fn write_u16(data: &mut Vec<u8>, val: u16) {
    data.extend_from_slice(&val.to_be_bytes());
}

fn write_u32(data: &mut Vec<u8>, val: u32) {
    data.extend_from_slice(&val.to_be_bytes());
}
