//! # TrueType Structural Parser
//!
//! Decodes the sfnt tables a simple-font embedding needs. Tables are read in
//! dependency order because later tables are sized by earlier ones:
//!
//! ```text
//! offset table -> head -> hhea -> maxp -> hmtx -> loca -> glyf
//!              -> cmap -> name -> OS/2 -> post
//! ```
//!
//! Glyphs are kept in an index-addressed arena ([`Glyph`]). Composite glyphs
//! record every component reference together with the byte offset of the
//! glyph id inside the glyph's data, so the subsetter can rewrite the
//! reference in place without decoding outlines.
//!
//! `head`, `hhea` and `maxp` are kept as typed records over their raw bytes.
//! The subsetter changes the typed fields; the bytes are only produced again
//! by `to_bytes` when the font is assembled.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use super::reader::{tag_name, TableReader, TableRecord, Tag};
use crate::error::{FolioError, Result};

const HEAD_MAGIC: u32 = 0x5F0F3CF5;

// Composite glyph flags
const ARG_1_AND_2_ARE_WORDS: u16 = 0x0001;
const WE_HAVE_A_SCALE: u16 = 0x0008;
const MORE_COMPONENTS: u16 = 0x0020;
const WE_HAVE_AN_X_AND_Y_SCALE: u16 = 0x0040;
const WE_HAVE_A_TWO_BY_TWO: u16 = 0x0080;

/// Tables carried into a subset verbatim when the source has them.
pub(crate) const PASSTHROUGH_TABLES: [Tag; 4] = [*b"cvt ", *b"fpgm", *b"prep", *b"name"];

/// A component reference inside a composite glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Byte offset of the component glyph id within the glyph data.
    pub offset: usize,
    pub glyph: u16,
}

/// A glyph name from a version 2.0 `post` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlyphName {
    /// Index into the standard Macintosh glyph order (0..258).
    Standard(u16),
    Custom(String),
}

#[derive(Debug, Clone)]
pub struct Glyph {
    pub advance: u16,
    pub lsb: i16,
    pub offset: u32,
    pub length: u32,
    pub components: Vec<Component>,
    pub name: Option<GlyphName>,
}

impl Glyph {
    pub fn is_composite(&self) -> bool {
        !self.components.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct HeadTable {
    raw: Vec<u8>,
    pub units_per_em: u16,
    pub x_min: i16,
    pub y_min: i16,
    pub x_max: i16,
    pub y_max: i16,
    pub index_to_loc_format: i16,
}

impl HeadTable {
    /// Table bytes with `checkSumAdjustment` cleared, ready for assembly.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = self.raw.clone();
        data[8..12].copy_from_slice(&[0, 0, 0, 0]);
        data
    }
}

#[derive(Debug, Clone)]
pub struct HheaTable {
    raw: Vec<u8>,
    pub number_of_h_metrics: u16,
}

impl HheaTable {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = self.raw.clone();
        data[34..36].copy_from_slice(&self.number_of_h_metrics.to_be_bytes());
        data
    }
}

#[derive(Debug, Clone)]
pub struct MaxpTable {
    raw: Vec<u8>,
    pub num_glyphs: u16,
}

impl MaxpTable {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut data = self.raw.clone();
        data[4..6].copy_from_slice(&self.num_glyphs.to_be_bytes());
        data
    }
}

/// Fields of `OS/2` used for embedding decisions and the font descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Os2Metrics {
    pub embeddable: bool,
    pub bold: bool,
    pub typo_ascender: i16,
    pub typo_descender: i16,
    /// Zero when the table version predates `sCapHeight`.
    pub cap_height: i16,
}

#[derive(Debug, Clone)]
pub struct PostTable {
    /// Bytes 4..32: italic angle, underline metrics, fixed pitch and memory hints.
    pub metrics: Vec<u8>,
    pub italic_angle: i16,
    pub underline_position: i16,
    pub underline_thickness: i16,
    pub is_fixed_pitch: bool,
    /// True for version 2.0, where glyph names were read.
    pub glyph_names: bool,
}

/// A fully parsed TrueType font.
///
/// The source handle is only held while parsing; everything the subsetter
/// needs afterwards lives in this struct.
#[derive(Debug, Clone)]
pub struct TrueTypeFont {
    pub(crate) directory: BTreeMap<Tag, TableRecord>,
    pub head: HeadTable,
    pub hhea: HheaTable,
    pub maxp: MaxpTable,
    pub glyphs: Vec<Glyph>,
    pub(crate) glyf: Vec<u8>,
    /// Unicode (BMP) codepoint to glyph id, from the (3,1) format 4 subtable.
    pub chars: BTreeMap<u16, u16>,
    pub postscript_name: String,
    pub os2: Os2Metrics,
    pub post: PostTable,
    pub(crate) passthrough: BTreeMap<Tag, Vec<u8>>,
}

impl TrueTypeFont {
    /// Parse a font file. The file is closed before this returns, on success
    /// and on failure alike.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        Self::parse(BufReader::new(file))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::parse(Cursor::new(data))
    }

    pub fn parse<R: Read + Seek>(source: R) -> Result<Self> {
        let mut r = TableReader::new(source);
        parse_offset_table(&mut r)?;
        let head = parse_head(&mut r)?;
        let hhea = parse_hhea(&mut r)?;
        let maxp = parse_maxp(&mut r)?;
        let mut glyphs = parse_hmtx(&mut r, hhea.number_of_h_metrics, maxp.num_glyphs)?;
        parse_loca(&mut r, head.index_to_loc_format, &mut glyphs)?;
        let glyf = parse_glyf(&mut r, &mut glyphs)?;
        let chars = parse_cmap(&mut r, glyphs.len())?;
        let postscript_name = parse_name(&mut r)?;
        let os2 = parse_os2(&mut r)?;
        let post = parse_post(&mut r, &mut glyphs)?;

        let mut passthrough = BTreeMap::new();
        for tag in PASSTHROUGH_TABLES {
            if r.has_table(&tag) {
                passthrough.insert(tag, r.read_table(&tag)?);
            }
        }

        Ok(TrueTypeFont {
            directory: r.directory().clone(),
            head,
            hhea,
            maxp,
            glyphs,
            glyf,
            chars,
            postscript_name,
            os2,
            post,
            passthrough,
        })
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph_id(&self, c: char) -> Option<u16> {
        u16::try_from(c as u32).ok().and_then(|c| self.chars.get(&c).copied())
    }

    /// Raw `glyf` bytes of one glyph (empty for glyphs without outlines).
    pub fn glyph_data(&self, id: u16) -> &[u8] {
        let glyph = &self.glyphs[id as usize];
        if glyph.length == 0 {
            return &[];
        }
        let start = glyph.offset as usize;
        &self.glyf[start..start + glyph.length as usize]
    }

    pub fn has_table(&self, tag: &Tag) -> bool {
        self.directory.contains_key(tag)
    }
}

// ─── Offset Table ───────────────────────────────────────────────

fn parse_offset_table<R: Read + Seek>(r: &mut TableReader<R>) -> Result<()> {
    let version = r.read_tag()?;
    if &version == b"OTTO" {
        return Err(FolioError::format(
            "OpenType fonts based on PostScript outlines are not supported",
        ));
    }
    if version != [0x00, 0x01, 0x00, 0x00] {
        return Err(FolioError::format("Unrecognized font file format"));
    }
    let num_tables = r.read_u16()?;
    r.skip(3 * 2)?; // searchRange, entrySelector, rangeShift
    let mut tables = BTreeMap::new();
    for _ in 0..num_tables {
        let tag = r.read_tag()?;
        let checksum = r.read_u32()?;
        let offset = r.read_u32()?;
        let length = r.read_u32()?;
        tables.insert(tag, TableRecord { checksum, offset, length });
    }
    r.set_directory(tables);
    Ok(())
}

// ─── Fixed-Layout Tables ────────────────────────────────────────

fn parse_head<R: Read + Seek>(r: &mut TableReader<R>) -> Result<HeadTable> {
    let raw = read_fixed_table(r, b"head", 54)?;
    r.seek_table(b"head")?;
    r.skip(3 * 4)?; // version, fontRevision, checkSumAdjustment
    if r.read_u32()? != HEAD_MAGIC {
        return Err(FolioError::format("Incorrect magic number in 'head'"));
    }
    r.skip(2)?; // flags
    let units_per_em = r.read_u16()?;
    if units_per_em == 0 {
        return Err(FolioError::format("unitsPerEm is zero"));
    }
    r.skip(2 * 8)?; // created, modified
    let x_min = r.read_i16()?;
    let y_min = r.read_i16()?;
    let x_max = r.read_i16()?;
    let y_max = r.read_i16()?;
    r.skip(3 * 2)?; // macStyle, lowestRecPPEM, fontDirectionHint
    let index_to_loc_format = r.read_i16()?;
    if index_to_loc_format != 0 && index_to_loc_format != 1 {
        return Err(FolioError::format(format!(
            "Unknown indexToLocFormat {}",
            index_to_loc_format
        )));
    }
    Ok(HeadTable {
        raw,
        units_per_em,
        x_min,
        y_min,
        x_max,
        y_max,
        index_to_loc_format,
    })
}

fn parse_hhea<R: Read + Seek>(r: &mut TableReader<R>) -> Result<HheaTable> {
    let raw = read_fixed_table(r, b"hhea", 36)?;
    r.seek_table(b"hhea")?;
    r.skip(4 + 15 * 2)?;
    let number_of_h_metrics = r.read_u16()?;
    Ok(HheaTable { raw, number_of_h_metrics })
}

fn parse_maxp<R: Read + Seek>(r: &mut TableReader<R>) -> Result<MaxpTable> {
    let raw = read_fixed_table(r, b"maxp", 6)?;
    r.seek_table(b"maxp")?;
    r.skip(4)?;
    let num_glyphs = r.read_u16()?;
    if num_glyphs == 0 {
        return Err(FolioError::format("Font has no glyphs"));
    }
    Ok(MaxpTable { raw, num_glyphs })
}

fn read_fixed_table<R: Read + Seek>(r: &mut TableReader<R>, tag: &Tag, min_len: usize) -> Result<Vec<u8>> {
    let raw = r.read_table(tag)?;
    if raw.len() < min_len {
        return Err(FolioError::format(format!(
            "'{}' table is too short ({} bytes)",
            tag_name(tag),
            raw.len()
        )));
    }
    Ok(raw)
}

// ─── Glyph Arena ────────────────────────────────────────────────

fn parse_hmtx<R: Read + Seek>(r: &mut TableReader<R>, num_h_metrics: u16, num_glyphs: u16) -> Result<Vec<Glyph>> {
    if num_h_metrics == 0 {
        return Err(FolioError::format("numberOfHMetrics is zero"));
    }
    r.seek_table(b"hmtx")?;
    let mut glyphs = Vec::with_capacity(num_glyphs as usize);
    let mut advance = 0;
    for i in 0..num_glyphs {
        if i < num_h_metrics {
            advance = r.read_u16()?;
        }
        let lsb = r.read_i16()?;
        glyphs.push(Glyph {
            advance,
            lsb,
            offset: 0,
            length: 0,
            components: Vec::new(),
            name: None,
        });
    }
    Ok(glyphs)
}

fn parse_loca<R: Read + Seek>(r: &mut TableReader<R>, format: i16, glyphs: &mut [Glyph]) -> Result<()> {
    r.seek_table(b"loca")?;
    let mut offsets = Vec::with_capacity(glyphs.len() + 1);
    for _ in 0..=glyphs.len() {
        let offset = if format == 0 {
            u32::from(r.read_u16()?) * 2
        } else {
            r.read_u32()?
        };
        offsets.push(offset);
    }
    for (i, glyph) in glyphs.iter_mut().enumerate() {
        let (start, end) = (offsets[i], offsets[i + 1]);
        if end < start {
            return Err(FolioError::format(format!("Glyph {} has a negative length in 'loca'", i)));
        }
        glyph.offset = start;
        glyph.length = end - start;
    }
    Ok(())
}

fn parse_glyf<R: Read + Seek>(r: &mut TableReader<R>, glyphs: &mut [Glyph]) -> Result<Vec<u8>> {
    let record = r.seek_table(b"glyf")?;
    let num_glyphs = glyphs.len();
    for (id, glyph) in glyphs.iter_mut().enumerate() {
        if glyph.length == 0 {
            continue;
        }
        if u64::from(glyph.offset) + u64::from(glyph.length) > u64::from(record.length) {
            return Err(FolioError::format(format!("Glyph {} lies outside 'glyf'", id)));
        }
        r.seek_to(u64::from(record.offset) + u64::from(glyph.offset))?;
        if r.read_i16()? >= 0 {
            continue;
        }
        let length = glyph.length as usize;
        let truncated = || FolioError::format(format!("Composite glyph {} is truncated", id));
        r.skip(4 * 2)?; // xMin, yMin, xMax, yMax
        let mut offset = 5 * 2;
        loop {
            if offset + 2 * 2 > length {
                return Err(truncated());
            }
            let flags = r.read_u16()?;
            let component = r.read_u16()?;
            if component as usize >= num_glyphs {
                return Err(FolioError::format(format!(
                    "Composite glyph {} references missing glyph {}",
                    id, component
                )));
            }
            glyph.components.push(Component {
                offset: offset + 2,
                glyph: component,
            });

            let mut skip = if flags & ARG_1_AND_2_ARE_WORDS != 0 { 2 * 2 } else { 2 };
            if flags & WE_HAVE_A_SCALE != 0 {
                skip += 2;
            } else if flags & WE_HAVE_AN_X_AND_Y_SCALE != 0 {
                skip += 2 * 2;
            } else if flags & WE_HAVE_A_TWO_BY_TWO != 0 {
                skip += 4 * 2;
            }
            if offset + 2 * 2 + skip > length {
                return Err(truncated());
            }
            r.skip(skip as i64)?;
            offset += 2 * 2 + skip;

            if flags & MORE_COMPONENTS == 0 {
                break;
            }
        }
    }
    r.read_table(b"glyf")
}

// ─── cmap ───────────────────────────────────────────────────────

fn parse_cmap<R: Read + Seek>(r: &mut TableReader<R>, num_glyphs: usize) -> Result<BTreeMap<u16, u16>> {
    let record = r.seek_table(b"cmap")?;
    r.skip(2)?; // version
    let num_tables = r.read_u16()?;
    let mut offset31 = None;
    for _ in 0..num_tables {
        let platform_id = r.read_u16()?;
        let encoding_id = r.read_u16()?;
        let offset = r.read_u32()?;
        if platform_id == 3 && encoding_id == 1 {
            offset31 = Some(offset);
        }
    }
    let offset31 = offset31.ok_or_else(|| FolioError::format("No Unicode encoding found in 'cmap'"))?;

    r.seek_to(u64::from(record.offset) + u64::from(offset31))?;
    let format = r.read_u16()?;
    if format != 4 {
        return Err(FolioError::format(format!("Unexpected cmap subtable format: {}", format)));
    }
    r.skip(2 * 2)?; // length, language
    let seg_count = (r.read_u16()? / 2) as usize;
    r.skip(3 * 2)?; // searchRange, entrySelector, rangeShift

    let mut end_count = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        end_count.push(r.read_u16()?);
    }
    r.skip(2)?; // reservedPad
    let mut start_count = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        start_count.push(r.read_u16()?);
    }
    let mut id_delta = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        id_delta.push(r.read_u16()?);
    }
    let range_offset_pos = r.position()?;
    let mut id_range_offset = Vec::with_capacity(seg_count);
    for _ in 0..seg_count {
        id_range_offset.push(r.read_u16()?);
    }

    let mut chars = BTreeMap::new();
    for i in 0..seg_count {
        let (c1, c2) = (start_count[i], end_count[i]);
        let delta = id_delta[i];
        let ro = id_range_offset[i];
        if ro > 0 {
            r.seek_to(range_offset_pos + 2 * i as u64 + u64::from(ro))?;
        }
        for c in u32::from(c1)..=u32::from(c2) {
            if c == 0xFFFF {
                break;
            }
            let gid = if ro > 0 {
                let g = r.read_u16()?;
                if g > 0 {
                    g.wrapping_add(delta)
                } else {
                    0
                }
            } else {
                (c as u16).wrapping_add(delta)
            };
            if gid > 0 && (gid as usize) < num_glyphs {
                chars.insert(c as u16, gid);
            }
        }
    }
    Ok(chars)
}

// ─── name / OS/2 / post ─────────────────────────────────────────

fn parse_name<R: Read + Seek>(r: &mut TableReader<R>) -> Result<String> {
    let record = r.seek_table(b"name")?;
    r.skip(2)?; // format
    let count = r.read_u16()?;
    let string_offset = r.read_u16()?;
    for _ in 0..count {
        r.skip(3 * 2)?; // platformID, encodingID, languageID
        let name_id = r.read_u16()?;
        let length = r.read_u16()?;
        let offset = r.read_u16()?;
        if name_id == 6 {
            r.seek_to(u64::from(record.offset) + u64::from(string_offset) + u64::from(offset))?;
            let raw = r.read_bytes(length as usize)?;
            let name: String = raw
                .iter()
                .filter(|&&b| b != 0 && !b" [](){}<>/%".contains(&b))
                .map(|&b| b as char)
                .collect();
            if name.is_empty() {
                break;
            }
            return Ok(name);
        }
    }
    Err(FolioError::format("PostScript name not found"))
}

fn parse_os2<R: Read + Seek>(r: &mut TableReader<R>) -> Result<Os2Metrics> {
    r.seek_table(b"OS/2")?;
    let version = r.read_u16()?;
    r.skip(3 * 2)?; // xAvgCharWidth, usWeightClass, usWidthClass
    let fs_type = r.read_u16()?;
    let embeddable = fs_type != 2 && (fs_type & 0x200) == 0;
    r.skip(11 * 2 + 10 + 4 * 4 + 4)?;
    let fs_selection = r.read_u16()?;
    let bold = fs_selection & 32 != 0;
    r.skip(2 * 2)?; // usFirstCharIndex, usLastCharIndex
    let typo_ascender = r.read_i16()?;
    let typo_descender = r.read_i16()?;
    let cap_height = if version >= 2 {
        r.skip(3 * 2 + 2 * 4 + 2)?;
        r.read_i16()?
    } else {
        0
    };
    Ok(Os2Metrics {
        embeddable,
        bold,
        typo_ascender,
        typo_descender,
        cap_height,
    })
}

fn parse_post<R: Read + Seek>(r: &mut TableReader<R>, glyphs: &mut [Glyph]) -> Result<PostTable> {
    r.seek_table(b"post")?;
    let version = r.read_u32()?;
    let metrics = r.read_bytes(28)?;
    let italic_angle = i16::from_be_bytes([metrics[0], metrics[1]]);
    let underline_position = i16::from_be_bytes([metrics[4], metrics[5]]);
    let underline_thickness = i16::from_be_bytes([metrics[6], metrics[7]]);
    let is_fixed_pitch = metrics[8..12] != [0, 0, 0, 0];

    let glyph_names = version == 0x0002_0000;
    if glyph_names {
        r.skip(2)?; // numberOfGlyphs
        let mut indices = Vec::with_capacity(glyphs.len());
        let mut num_names = 0usize;
        for _ in 0..glyphs.len() {
            let index = r.read_u16()?;
            if index >= 258 {
                num_names = num_names.max(index as usize - 257);
            }
            indices.push(index);
        }
        let mut names = Vec::with_capacity(num_names);
        for _ in 0..num_names {
            let len = r.read_u8()?;
            let raw = r.read_bytes(len as usize)?;
            names.push(String::from_utf8_lossy(&raw).into_owned());
        }
        for (glyph, index) in glyphs.iter_mut().zip(indices) {
            glyph.name = Some(if index >= 258 {
                GlyphName::Custom(names[index as usize - 258].clone())
            } else {
                GlyphName::Standard(index)
            });
        }
    }

    Ok(PostTable {
        metrics,
        italic_angle,
        underline_position,
        underline_thickness,
        is_fixed_pitch,
        glyph_names,
    })
}
