//! # Font Management
//!
//! Font definitions, the sources they are loaded from, and the per-document
//! registry that assigns resource names (`/F1`, `/F2`, ...).
//!
//! A [`FontDefinition`] carries everything the writer needs for a simple
//! (single-byte) font: 256 glyph widths, underline metrics, an optional
//! descriptor and the embedded file when there is one. Definitions come
//! from three places:
//!
//! - [`CoreFonts`]: built-in metrics for the Courier and Helvetica families
//! - [`DefinitionDirectory`]: JSON definitions plus font files on disk
//! - [`embed::truetype_definition`]: a TrueType font parsed and subset in
//!   memory

pub mod embed;
pub mod reader;
pub mod standard;
pub mod subset;
pub mod truetype;

#[cfg(test)]
pub(crate) mod fixture;

pub use embed::EmbedOptions;
pub use standard::CoreFonts;

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::encoding::cp1252_to_unicode;
use crate::error::{FolioError, Result};

/// Families every PDF viewer provides without embedding.
pub const CORE_FAMILIES: [&str; 5] = ["courier", "helvetica", "times", "symbol", "zapfdingbats"];

/// The Unicode value of one code, or of a run of consecutive codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnicodeEntry {
    Char(u32),
    /// First Unicode value and the length of the run.
    Range(u32, u32),
}

/// Code to Unicode mapping used for the ToUnicode CMap.
pub type UnicodeMap = BTreeMap<u8, UnicodeEntry>;

/// An embedded font program.
#[derive(Debug, Clone, PartialEq)]
pub struct FontFile {
    /// Identity of the file. Fonts sharing a name share one stream.
    pub name: String,
    pub data: Vec<u8>,
    /// The data is already zlib-compressed.
    pub deflated: bool,
    /// `/Length1`: the uncompressed TrueType size, or the clear-text part of a Type1 program.
    pub length1: usize,
    /// `/Length2`: the encrypted part of a Type1 program.
    pub length2: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FontKind {
    Core,
    Type1 { file: Option<FontFile> },
    TrueType { file: Option<FontFile> },
}

/// `/FontDescriptor` values, in the order they are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FontDescriptor {
    pub ascent: i32,
    pub descent: i32,
    pub cap_height: i32,
    pub flags: u32,
    #[serde(rename = "FontBBox")]
    pub font_bbox: [i32; 4],
    pub italic_angle: f64,
    #[serde(rename = "StemV")]
    pub stem_v: i32,
    pub missing_width: u16,
}

impl FontDescriptor {
    /// The descriptor entries after `/FontName`.
    pub fn to_pdf(&self) -> String {
        let [x0, y0, x1, y1] = self.font_bbox;
        format!(
            "/Ascent {} /Descent {} /CapHeight {} /Flags {} /FontBBox [{} {} {} {}] /ItalicAngle {} /StemV {} /MissingWidth {}",
            self.ascent,
            self.descent,
            self.cap_height,
            self.flags,
            x0,
            y0,
            x1,
            y1,
            self.italic_angle,
            self.stem_v,
            self.missing_width
        )
    }
}

/// Everything needed to measure text in a font and to write it out.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDefinition {
    /// PostScript base font name.
    pub name: String,
    pub kind: FontKind,
    /// Advance widths for codes 0..=255 in thousandths of the font size.
    pub widths: Vec<u16>,
    pub underline_position: i32,
    pub underline_thickness: i32,
    pub descriptor: Option<FontDescriptor>,
    /// `/Differences` array body relative to WinAnsiEncoding.
    pub diff: Option<String>,
    /// Encoding name. Fonts with the same name share Encoding and ToUnicode objects.
    pub encoding: Option<String>,
    pub unicode_map: Option<UnicodeMap>,
    pub subsetted: bool,
}

impl FontDefinition {
    pub fn char_width(&self, code: u8) -> u16 {
        self.widths.get(code as usize).copied().unwrap_or(0)
    }

    /// Sum of the widths of `text`, in thousandths of the font size.
    pub fn string_width(&self, text: &[u8]) -> u32 {
        text.iter().map(|&c| u32::from(self.char_width(c))).sum()
    }

    pub fn file(&self) -> Option<&FontFile> {
        match &self.kind {
            FontKind::Core => None,
            FontKind::Type1 { file } | FontKind::TrueType { file } => file.as_ref(),
        }
    }

    /// The `/BaseFont` name, with the subset tag when the program is a subset.
    pub fn base_font(&self) -> String {
        if self.subsetted {
            format!("AAAAAA+{}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Key of the shared ToUnicode CMap: the encoding name, else the font name.
    pub fn cmap_key(&self) -> &str {
        self.encoding.as_deref().unwrap_or(&self.name)
    }
}

/// The Unicode map of cp1252 with consecutive codes merged into runs.
pub fn cp1252_unicode_map() -> UnicodeMap {
    let mut map = UnicodeMap::new();
    // (first code, last code, first unicode)
    let mut run: Option<(u8, u8, u32)> = None;
    for code in 0..=255u8 {
        let Some(uv) = cp1252_to_unicode(code).map(u32::from) else {
            continue;
        };
        run = match run {
            Some((first, last, start))
                if u32::from(code) == u32::from(last) + 1 && uv == start + u32::from(last - first) + 1 =>
            {
                Some((first, code, start))
            }
            Some(done) => {
                insert_run(&mut map, done);
                Some((code, code, uv))
            }
            None => Some((code, code, uv)),
        };
    }
    if let Some(done) = run {
        insert_run(&mut map, done);
    }
    map
}

fn insert_run(map: &mut UnicodeMap, (first, last, start): (u8, u8, u32)) {
    let len = u32::from(last - first) + 1;
    let entry = if len > 1 {
        UnicodeEntry::Range(start, len)
    } else {
        UnicodeEntry::Char(start)
    };
    map.insert(first, entry);
}

/// The ToUnicode CMap program for a single-byte font.
pub fn to_unicode_cmap(map: &UnicodeMap) -> String {
    let mut ranges = String::new();
    let mut num_ranges = 0;
    let mut chars = String::new();
    let mut num_chars = 0;
    for (&code, entry) in map {
        match *entry {
            UnicodeEntry::Range(start, len) => {
                let _ = writeln!(ranges, "<{:02X}> <{:02X}> <{:04X}>", code, u32::from(code) + len - 1, start);
                num_ranges += 1;
            }
            UnicodeEntry::Char(uv) => {
                let _ = writeln!(chars, "<{:02X}> <{:04X}>", code, uv);
                num_chars += 1;
            }
        }
    }

    let mut s = String::from(
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo\n\
         <</Registry (Adobe)\n\
         /Ordering (UCS)\n\
         /Supplement 0\n\
         >> def\n\
         /CMapName /Adobe-Identity-UCS def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <00> <FF>\n\
         endcodespacerange\n",
    );
    if num_ranges > 0 {
        let _ = write!(s, "{} beginbfrange\n{}endbfrange\n", num_ranges, ranges);
    }
    if num_chars > 0 {
        let _ = write!(s, "{} beginbfchar\n{}endbfchar\n", num_chars, chars);
    }
    s.push_str(
        "endcmap\n\
         CMapName currentdict /CMap defineresource pop\n\
         end\n\
         end",
    );
    s
}

// ─── Keys ───────────────────────────────────────────────────────

/// Upper-case a style string, strip the underline flag and order the
/// remaining letters as `B` before `I`.
///
/// Returns the style and whether `U` was present.
pub fn normalize_style(style: &str) -> (String, bool) {
    let upper = style.to_uppercase();
    let underline = upper.contains('U');
    let mut out = String::new();
    if upper.contains('B') {
        out.push('B');
    }
    if upper.contains('I') {
        out.push('I');
    }
    (out, underline)
}

pub fn font_key(family: &str, style: &str) -> String {
    format!("{}{}", family, style)
}

// ─── Sources ────────────────────────────────────────────────────

/// Supplies font definitions by normalized family and style.
pub trait FontSource {
    fn load(&self, family: &str, style: &str) -> Result<FontDefinition>;
}

/// JSON font definitions (`<family><style>.json`) and their font files.
///
/// Families without a definition file fall back to [`CoreFonts`].
pub struct DefinitionDirectory {
    dir: PathBuf,
}

impl DefinitionDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DefinitionDirectory { dir: dir.into() }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn definition_path(&self, family: &str, style: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}.json", family.replace(' ', ""), style.to_lowercase()))
    }
}

impl FontSource for DefinitionDirectory {
    fn load(&self, family: &str, style: &str) -> Result<FontDefinition> {
        let path = self.definition_path(family, style);
        if !path.is_file() {
            return CoreFonts.load(family, style);
        }
        debug!("Loading font definition {}", path.display());
        let text = fs::read_to_string(&path)?;
        let file: DefinitionFile = serde_json::from_str(&text)?;
        file.into_definition(&self.dir)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
enum DefinitionType {
    Core,
    Type1,
    TrueType,
}

/// On-disk font definition.
#[derive(Debug, Deserialize)]
struct DefinitionFile {
    #[serde(rename = "type")]
    kind: DefinitionType,
    name: String,
    #[serde(default)]
    desc: Option<FontDescriptor>,
    #[serde(default = "default_underline_position")]
    up: i32,
    #[serde(default = "default_underline_thickness")]
    ut: i32,
    cw: Vec<u16>,
    #[serde(default)]
    enc: Option<String>,
    #[serde(default)]
    diff: Option<String>,
    #[serde(default)]
    uv: Option<UnicodeMap>,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    originalsize: Option<usize>,
    #[serde(default)]
    size1: Option<usize>,
    #[serde(default)]
    size2: Option<usize>,
    #[serde(default)]
    subsetted: bool,
}

fn default_underline_position() -> i32 {
    -100
}

fn default_underline_thickness() -> i32 {
    50
}

impl DefinitionFile {
    fn into_definition(self, dir: &Path) -> Result<FontDefinition> {
        if self.cw.len() != 256 {
            return Err(FolioError::format(format!(
                "Font definition for {} has {} widths, expected 256",
                self.name,
                self.cw.len()
            )));
        }
        let file = match &self.file {
            Some(file) if !file.is_empty() && self.kind != DefinitionType::Core => {
                Some(self.load_file(dir, file)?)
            }
            _ => None,
        };
        let kind = match self.kind {
            DefinitionType::Core => FontKind::Core,
            DefinitionType::Type1 => FontKind::Type1 { file },
            DefinitionType::TrueType => FontKind::TrueType { file },
        };
        Ok(FontDefinition {
            name: self.name,
            kind,
            widths: self.cw,
            underline_position: self.up,
            underline_thickness: self.ut,
            descriptor: self.desc,
            diff: self.diff.filter(|d| !d.is_empty()),
            encoding: self.enc,
            unicode_map: self.uv,
            subsetted: self.subsetted,
        })
    }

    fn load_file(&self, dir: &Path, name: &str) -> Result<FontFile> {
        let path = dir.join(name);
        let data = fs::read(&path).map_err(|e| {
            FolioError::config(format!("Font file not found: {} ({})", path.display(), e))
        })?;
        let deflated = name.ends_with(".z");

        if self.kind == DefinitionType::TrueType {
            let length1 = self.originalsize.unwrap_or(data.len());
            return Ok(FontFile {
                name: name.to_string(),
                data,
                deflated,
                length1,
                length2: None,
            });
        }

        let (Some(length1), Some(length2)) = (self.size1, self.size2) else {
            return Err(FolioError::format(format!("Type1 definition {} lacks size1/size2", self.name)));
        };
        let data = if deflated { data } else { strip_pfb_headers(&data, length1, length2)? };
        Ok(FontFile {
            name: name.to_string(),
            data,
            deflated,
            length1,
            length2: Some(length2),
        })
    }
}

/// Drop the two 6-byte PFB segment headers around the clear-text and
/// binary parts of a Type1 program.
fn strip_pfb_headers(data: &[u8], length1: usize, length2: usize) -> Result<Vec<u8>> {
    let second = 6 + length1 + 6;
    if data.len() < second + length2 {
        return Err(FolioError::format("Type1 font file is shorter than its declared segments"));
    }
    let mut out = Vec::with_capacity(length1 + length2);
    out.extend_from_slice(&data[6..6 + length1]);
    out.extend_from_slice(&data[second..second + length2]);
    Ok(out)
}

// ─── Registry ───────────────────────────────────────────────────

/// A font registered with a document.
#[derive(Debug, Clone)]
pub struct RegisteredFont {
    /// 1-based resource number (`/F<index>`).
    pub index: usize,
    pub key: String,
    pub definition: FontDefinition,
}

/// Fonts of one document in registration order.
#[derive(Debug, Default)]
pub struct FontRegistry {
    fonts: Vec<RegisteredFont>,
    keys: HashMap<String, usize>,
}

impl FontRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.keys.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&RegisteredFont> {
        self.keys.get(key).map(|&i| &self.fonts[i])
    }

    /// Register a definition under `key`. An existing key keeps its font.
    pub fn insert(&mut self, key: String, definition: FontDefinition) -> &RegisteredFont {
        let slot = match self.keys.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = self.fonts.len();
                debug!("Registered font {} as /F{} ({})", key, slot + 1, definition.name);
                self.fonts.push(RegisteredFont {
                    index: slot + 1,
                    key: key.clone(),
                    definition,
                });
                self.keys.insert(key, slot);
                slot
            }
        };
        &self.fonts[slot]
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredFont> {
        self.fonts.iter()
    }

    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cp1252_unicode_map_runs() {
        let map = cp1252_unicode_map();
        assert_eq!(map.get(&0), Some(&UnicodeEntry::Range(0, 128)));
        assert_eq!(map.get(&128), Some(&UnicodeEntry::Char(0x20AC)));
        assert_eq!(map.get(&129), None);
        assert_eq!(map.get(&134), Some(&UnicodeEntry::Range(0x2020, 2)));
        assert_eq!(map.get(&145), Some(&UnicodeEntry::Range(0x2018, 2)));
        assert_eq!(map.get(&160), Some(&UnicodeEntry::Range(160, 96)));
    }

    #[test]
    fn test_to_unicode_cmap_sections() {
        let mut map = UnicodeMap::new();
        map.insert(32, UnicodeEntry::Range(32, 95));
        map.insert(128, UnicodeEntry::Char(0x20AC));
        let cmap = to_unicode_cmap(&map);
        assert!(cmap.contains("1 beginbfrange\n<20> <7E> <0020>\nendbfrange\n"));
        assert!(cmap.contains("1 beginbfchar\n<80> <20AC>\nendbfchar\n"));
        assert!(cmap.starts_with("/CIDInit /ProcSet findresource begin\n"));
        assert!(cmap.ends_with("end\nend"));
    }

    #[test]
    fn test_normalize_style() {
        assert_eq!(normalize_style("ib"), ("BI".to_string(), false));
        assert_eq!(normalize_style("UB"), ("B".to_string(), true));
        assert_eq!(normalize_style(""), (String::new(), false));
    }

    #[test]
    fn test_registry_keeps_first_definition() {
        let mut registry = FontRegistry::new();
        let helvetica = CoreFonts.load("helvetica", "").unwrap();
        let courier = CoreFonts.load("courier", "").unwrap();
        assert_eq!(registry.insert("helvetica".into(), helvetica).index, 1);
        assert_eq!(registry.insert("courier".into(), courier.clone()).index, 2);
        let again = registry.insert("helvetica".into(), courier);
        assert_eq!(again.index, 1);
        assert_eq!(again.definition.name, "Helvetica");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_descriptor_pdf_entries() {
        let desc = FontDescriptor {
            ascent: 800,
            descent: -200,
            cap_height: 700,
            flags: 32,
            font_bbox: [-50, -200, 950, 800],
            italic_angle: 0.0,
            stem_v: 70,
            missing_width: 500,
        };
        assert_eq!(
            desc.to_pdf(),
            "/Ascent 800 /Descent -200 /CapHeight 700 /Flags 32 /FontBBox [-50 -200 950 800] /ItalicAngle 0 /StemV 70 /MissingWidth 500"
        );
    }

    #[test]
    fn test_definition_directory_reads_json() {
        let dir = std::env::temp_dir().join(format!("folio-fontdir-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let widths = vec![250u16; 256];
        let json = serde_json::json!({
            "type": "Core",
            "name": "Times-Roman",
            "up": -100,
            "ut": 50,
            "cw": widths,
            "enc": "cp1252",
            "uv": { "0": [0, 128], "128": 8364 }
        });
        fs::write(dir.join("times.json"), json.to_string()).unwrap();

        let source = DefinitionDirectory::new(&dir);
        let def = source.load("times", "").unwrap();
        assert_eq!(def.name, "Times-Roman");
        assert_eq!(def.kind, FontKind::Core);
        assert_eq!(def.char_width(b'A'), 250);
        let uv = def.unicode_map.unwrap();
        assert_eq!(uv.get(&128), Some(&UnicodeEntry::Char(8364)));

        // No file for bold Times and no built-in metrics either
        assert!(matches!(source.load("times", "B"), Err(FolioError::Configuration(_))));
        // Helvetica falls back to the built-in tables
        assert_eq!(source.load("helvetica", "B").unwrap().name, "Helvetica-Bold");
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_strip_pfb_headers() {
        let mut pfb = vec![0x80, 0x01, 3, 0, 0, 0];
        pfb.extend_from_slice(b"abc");
        pfb.extend_from_slice(&[0x80, 0x02, 2, 0, 0, 0]);
        pfb.extend_from_slice(b"de");
        assert_eq!(strip_pfb_headers(&pfb, 3, 2).unwrap(), b"abcde".to_vec());
        assert!(strip_pfb_headers(&pfb, 3, 5).is_err());
    }
}
