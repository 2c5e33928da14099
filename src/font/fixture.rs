//! Synthetic TrueType font for tests.
//!
//! Glyph layout:
//!
//! ```text
//! 0 .notdef   simple
//! 1 'A'       simple
//! 2 'C'       simple
//! 3 'D'       simple
//! 4 ' '       empty
//! 5 'Ä'       composite: 1 + 6
//! 6 dieresis  simple, unmapped, lsb-only metrics
//! 7 'E'       composite: 5 (nested), lsb-only metrics
//! ```
//!
//! `B` is deliberately absent from the cmap.

#![allow(dead_code)]

pub const HEAD_MAGIC: u32 = 0x5F0F3CF5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostVersion {
    V2,
    V3,
}

#[derive(Debug, Clone)]
pub struct FixtureFont {
    pub head_magic: u32,
    pub cmap_platform: (u16, u16),
    pub fs_type: u16,
    pub bold: bool,
    pub italic_angle: i16,
    pub fixed_pitch: bool,
    pub post_version: PostVersion,
    pub omit_post: bool,
    pub long_loca: bool,
    pub hinting: bool,
}

impl Default for FixtureFont {
    fn default() -> Self {
        FixtureFont {
            head_magic: HEAD_MAGIC,
            cmap_platform: (3, 1),
            fs_type: 0,
            bold: false,
            italic_angle: 0,
            fixed_pitch: false,
            post_version: PostVersion::V2,
            omit_post: false,
            long_loca: false,
            hinting: true,
        }
    }
}

const ADVANCES: [u16; 6] = [500, 600, 620, 640, 250, 610];
const LSBS: [i16; 8] = [10, 20, 21, 22, 0, 20, 16, 17];

impl FixtureFont {
    pub fn build(&self) -> Vec<u8> {
        let glyphs = glyph_data();
        let mut glyf = Vec::new();
        let mut offsets = Vec::new();
        for g in &glyphs {
            offsets.push(glyf.len() as u32);
            glyf.extend_from_slice(g);
        }
        offsets.push(glyf.len() as u32);

        let mut loca = Vec::new();
        for &o in &offsets {
            if self.long_loca {
                loca.extend_from_slice(&o.to_be_bytes());
            } else {
                loca.extend_from_slice(&((o / 2) as u16).to_be_bytes());
            }
        }

        let mut hmtx = Vec::new();
        for (i, lsb) in LSBS.iter().enumerate() {
            if i < ADVANCES.len() {
                hmtx.extend_from_slice(&ADVANCES[i].to_be_bytes());
            }
            hmtx.extend_from_slice(&lsb.to_be_bytes());
        }

        let mut tables: Vec<([u8; 4], Vec<u8>)> = vec![
            (*b"cmap", self.cmap()),
            (*b"glyf", glyf),
            (*b"head", self.head()),
            (*b"hhea", hhea()),
            (*b"hmtx", hmtx),
            (*b"loca", loca),
            (*b"maxp", maxp()),
            (*b"name", name()),
            (*b"OS/2", self.os2()),
        ];
        if !self.omit_post {
            tables.push((*b"post", self.post()));
        }
        if self.hinting {
            tables.push((*b"cvt ", vec![0, 10, 0, 20]));
            tables.push((*b"prep", vec![0xB0, 0x01, 0x2C]));
        }
        tables.sort_by(|a, b| a.0.cmp(&b.0));
        assemble(&tables)
    }

    fn head(&self) -> Vec<u8> {
        let mut d = Vec::new();
        d.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
        d.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // fontRevision
        d.extend_from_slice(&0u32.to_be_bytes()); // checkSumAdjustment
        d.extend_from_slice(&self.head_magic.to_be_bytes());
        d.extend_from_slice(&0x000Bu16.to_be_bytes()); // flags
        d.extend_from_slice(&1000u16.to_be_bytes()); // unitsPerEm
        d.extend_from_slice(&[0u8; 16]); // created, modified
        for v in [-50i16, -200, 950, 800] {
            d.extend_from_slice(&v.to_be_bytes());
        }
        d.extend_from_slice(&0u16.to_be_bytes()); // macStyle
        d.extend_from_slice(&8u16.to_be_bytes()); // lowestRecPPEM
        d.extend_from_slice(&2i16.to_be_bytes()); // fontDirectionHint
        d.extend_from_slice(&(self.long_loca as i16).to_be_bytes());
        d.extend_from_slice(&0i16.to_be_bytes()); // glyphDataFormat
        d
    }

    fn cmap(&self) -> Vec<u8> {
        // (start, end, delta, glyph array)
        let segments: [(u16, u16, i16, &[u16]); 5] = [
            (0x20, 0x20, 4 - 0x20, &[]),
            (0x41, 0x41, 1 - 0x41, &[]),
            (0x43, 0x45, 0, &[2, 3, 7]),
            (0xC4, 0xC4, 5 - 0xC4, &[]),
            (0xFFFF, 0xFFFF, 1, &[]),
        ];
        let seg_count = segments.len() as u16;
        let mut ends = Vec::new();
        let mut starts = Vec::new();
        let mut deltas = Vec::new();
        let mut range_offsets = Vec::new();
        let mut glyph_ids = Vec::new();
        for (i, (start, end, delta, ids)) in segments.iter().enumerate() {
            ends.extend_from_slice(&end.to_be_bytes());
            starts.extend_from_slice(&start.to_be_bytes());
            deltas.extend_from_slice(&delta.to_be_bytes());
            if ids.is_empty() {
                range_offsets.extend_from_slice(&0u16.to_be_bytes());
            } else {
                let ro = glyph_ids.len() as u16 + (seg_count - i as u16) * 2;
                range_offsets.extend_from_slice(&ro.to_be_bytes());
                for id in ids.iter() {
                    glyph_ids.extend_from_slice(&id.to_be_bytes());
                }
            }
        }
        let mut sub = Vec::new();
        sub.extend_from_slice(&4u16.to_be_bytes());
        let length = 16 + 8 * seg_count + glyph_ids.len() as u16;
        sub.extend_from_slice(&length.to_be_bytes());
        sub.extend_from_slice(&0u16.to_be_bytes()); // language
        sub.extend_from_slice(&(seg_count * 2).to_be_bytes());
        sub.extend_from_slice(&8u16.to_be_bytes()); // searchRange
        sub.extend_from_slice(&2u16.to_be_bytes()); // entrySelector
        sub.extend_from_slice(&2u16.to_be_bytes()); // rangeShift
        sub.extend_from_slice(&ends);
        sub.extend_from_slice(&0u16.to_be_bytes());
        sub.extend_from_slice(&starts);
        sub.extend_from_slice(&deltas);
        sub.extend_from_slice(&range_offsets);
        sub.extend_from_slice(&glyph_ids);

        let mut d = Vec::new();
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&1u16.to_be_bytes());
        d.extend_from_slice(&self.cmap_platform.0.to_be_bytes());
        d.extend_from_slice(&self.cmap_platform.1.to_be_bytes());
        d.extend_from_slice(&12u32.to_be_bytes());
        d.extend_from_slice(&sub);
        d
    }

    fn os2(&self) -> Vec<u8> {
        let mut d = vec![0u8; 96];
        put_u16(&mut d, 0, 4); // version
        put_u16(&mut d, 2, 560); // xAvgCharWidth
        put_u16(&mut d, 4, if self.bold { 700 } else { 400 });
        put_u16(&mut d, 6, 5);
        put_u16(&mut d, 8, self.fs_type);
        put_u16(&mut d, 62, if self.bold { 0x20 } else { 0x40 });
        put_u16(&mut d, 64, 0x20);
        put_u16(&mut d, 66, 0xC4);
        put_u16(&mut d, 68, 800u16);
        put_u16(&mut d, 70, (-200i16) as u16);
        put_u16(&mut d, 74, 900);
        put_u16(&mut d, 76, 250);
        put_u16(&mut d, 86, 500); // sxHeight
        put_u16(&mut d, 88, 700); // sCapHeight
        d
    }

    fn post(&self) -> Vec<u8> {
        let mut d = Vec::new();
        let version: u32 = match self.post_version {
            PostVersion::V2 => 0x0002_0000,
            PostVersion::V3 => 0x0003_0000,
        };
        d.extend_from_slice(&version.to_be_bytes());
        d.extend_from_slice(&self.italic_angle.to_be_bytes());
        d.extend_from_slice(&0u16.to_be_bytes());
        d.extend_from_slice(&(-100i16).to_be_bytes());
        d.extend_from_slice(&50i16.to_be_bytes());
        d.extend_from_slice(&(self.fixed_pitch as u32).to_be_bytes());
        d.extend_from_slice(&[0u8; 16]);
        if self.post_version == PostVersion::V2 {
            d.extend_from_slice(&8u16.to_be_bytes());
            for index in [0u16, 36, 38, 39, 3, 138, 258, 259] {
                d.extend_from_slice(&index.to_be_bytes());
            }
            for name in ["dieresiscomb", "E.alt"] {
                d.push(name.len() as u8);
                d.extend_from_slice(name.as_bytes());
            }
        }
        d
    }
}

fn glyph_data() -> Vec<Vec<u8>> {
    vec![
        simple_glyph(100),
        simple_glyph(600),
        simple_glyph(620),
        simple_glyph(640),
        Vec::new(),
        // 'Ä' = 'A' + dieresis (words, xy values, more components)
        composite_glyph(&[(0x0023, 1, 0, 0), (0x0003, 6, 0, 300)]),
        simple_glyph(200),
        composite_glyph(&[(0x0003, 5, 0, 0)]),
    ]
}

fn simple_glyph(x_max: i16) -> Vec<u8> {
    let mut d = Vec::new();
    for v in [1i16, 0, 0, x_max, 700] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    d.extend_from_slice(&2u16.to_be_bytes()); // endPtsOfContours[0]
    d.extend_from_slice(&0u16.to_be_bytes()); // instructionLength
    d.extend_from_slice(&[0x01, 0x01, 0x01]);
    for v in [0i16, x_max / 2, x_max / 2] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    for v in [0i16, 700, -700] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    d.push(0); // pad to an even length
    d
}

fn composite_glyph(components: &[(u16, u16, i16, i16)]) -> Vec<u8> {
    let mut d = Vec::new();
    for v in [-1i16, 0, 0, 600, 900] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    for &(flags, glyph, dx, dy) in components {
        d.extend_from_slice(&flags.to_be_bytes());
        d.extend_from_slice(&glyph.to_be_bytes());
        d.extend_from_slice(&dx.to_be_bytes());
        d.extend_from_slice(&dy.to_be_bytes());
    }
    d
}

fn hhea() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    for v in [800i16, -200, 0] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    d.extend_from_slice(&640u16.to_be_bytes()); // advanceWidthMax
    for v in [0i16, 0, 950, 1, 0, 0, 0, 0, 0, 0, 0] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    d.extend_from_slice(&(ADVANCES.len() as u16).to_be_bytes());
    d
}

fn maxp() -> Vec<u8> {
    let mut d = Vec::new();
    d.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    d.extend_from_slice(&(LSBS.len() as u16).to_be_bytes());
    for v in [3u16, 1, 6, 2, 2, 0, 0, 0, 0, 0, 0, 2, 2] {
        d.extend_from_slice(&v.to_be_bytes());
    }
    d
}

fn name() -> Vec<u8> {
    let family = b"Fixture".to_vec();
    let ps: Vec<u8> = "Fixture-Regular"
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();
    let mut d = Vec::new();
    d.extend_from_slice(&0u16.to_be_bytes());
    d.extend_from_slice(&2u16.to_be_bytes());
    d.extend_from_slice(&30u16.to_be_bytes());
    for (platform, encoding, language, name_id, len, offset) in [
        (1u16, 0u16, 0u16, 1u16, family.len() as u16, 0u16),
        (3, 1, 0x0409, 6, ps.len() as u16, family.len() as u16),
    ] {
        for v in [platform, encoding, language, name_id, len, offset] {
            d.extend_from_slice(&v.to_be_bytes());
        }
    }
    d.extend_from_slice(&family);
    d.extend_from_slice(&ps);
    d
}

fn put_u16(d: &mut [u8], pos: usize, v: u16) {
    d[pos..pos + 2].copy_from_slice(&v.to_be_bytes());
}

/// Wrapping sum of big-endian words over zero-padded data.
pub fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn assemble(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let n = tables.len() as u16;
    let entry_selector = 15 - n.leading_zeros() as u16;
    let search_range = 16 * (1u16 << entry_selector);
    let mut out = Vec::new();
    out.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    out.extend_from_slice(&n.to_be_bytes());
    out.extend_from_slice(&search_range.to_be_bytes());
    out.extend_from_slice(&entry_selector.to_be_bytes());
    out.extend_from_slice(&(16 * n - search_range).to_be_bytes());

    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in tables {
        out.extend_from_slice(tag);
        out.extend_from_slice(&checksum(data).to_be_bytes());
        out.extend_from_slice(&(offset as u32).to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    out.extend_from_slice(&body);
    out
}
