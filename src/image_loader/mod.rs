//! # Image Loading
//!
//! Resolves image sources (file paths, data URIs, raw base64 or bytes) and
//! turns them into [`ImageInfo`] records ready for embedding. JPEG passes
//! through untouched as `DCTDecode`. PNG goes through our own chunk decoder.
//! GIF is decoded by the `image` crate and re-encoded as PNG first.
//!
//! Every source is embedded once: repeated calls with the same file (by
//! canonical path) or the same bytes (by content hash) return the cached
//! record.

pub mod png;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::io::Cursor;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::{FolioError, Result};

/// Color space of an embedded raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    /// Palette of packed RGB triplets.
    Indexed { palette: Vec<u8> },
}

impl ColorSpace {
    pub fn name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
            ColorSpace::Indexed { .. } => "Indexed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    FlateDecode,
    DCTDecode,
}

impl Filter {
    pub fn name(self) -> &'static str {
        match self {
            Filter::FlateDecode => "FlateDecode",
            Filter::DCTDecode => "DCTDecode",
        }
    }
}

/// An image ready for the PDF serializer.
#[derive(Debug, Clone)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    pub filter: Option<Filter>,
    /// Body of the `/DecodeParms` dictionary.
    pub decode_parms: Option<String>,
    /// Color-key mask, one value per component.
    pub trns: Option<Vec<u8>>,
    pub data: Vec<u8>,
    /// Separate 8-bit alpha plane, compressed like `data`.
    pub smask: Option<Vec<u8>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Parse a file extension or type name (`jpg`, `jpeg`, `png`, `gif`).
    pub fn from_name(name: &str) -> Result<Self> {
        match name.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(ImageFormat::Jpeg),
            "png" => Ok(ImageFormat::Png),
            "gif" => Ok(ImageFormat::Gif),
            other => Err(FolioError::config(format!("Unsupported image type: {}", other))),
        }
    }

    /// Sniff the format from magic bytes.
    pub fn detect(data: &[u8]) -> Option<Self> {
        if is_jpeg(data) {
            Some(ImageFormat::Jpeg)
        } else if is_png(data) {
            Some(ImageFormat::Png)
        } else if data.starts_with(b"GIF8") {
            Some(ImageFormat::Gif)
        } else {
            None
        }
    }
}

/// Where image bytes come from.
#[derive(Debug, Clone, Copy)]
pub enum ImageSource<'a> {
    /// A file path, a `data:image/...;base64,` URI, or raw base64.
    Src(&'a str),
    Bytes(&'a [u8]),
}

impl<'a> From<&'a str> for ImageSource<'a> {
    fn from(src: &'a str) -> Self {
        ImageSource::Src(src)
    }
}

impl<'a> From<&'a String> for ImageSource<'a> {
    fn from(src: &'a String) -> Self {
        ImageSource::Src(src)
    }
}

impl<'a> From<&'a [u8]> for ImageSource<'a> {
    fn from(data: &'a [u8]) -> Self {
        ImageSource::Bytes(data)
    }
}

impl<'a> From<&'a Vec<u8>> for ImageSource<'a> {
    fn from(data: &'a Vec<u8>) -> Self {
        ImageSource::Bytes(data)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ImageKey {
    Path(PathBuf),
    Content(u64),
}

/// Decode `data` as `format`.
pub fn decode(data: &[u8], format: ImageFormat) -> Result<ImageInfo> {
    match format {
        ImageFormat::Jpeg => decode_jpeg(data),
        ImageFormat::Png => png::decode(data),
        ImageFormat::Gif => decode_gif(data),
    }
}

struct Resolved {
    key: ImageKey,
    data: Vec<u8>,
    /// Format named by the source itself (extension or MIME type).
    hinted: Option<ImageFormat>,
}

fn resolve(source: ImageSource<'_>) -> Result<Resolved> {
    let src = match source {
        ImageSource::Bytes(data) => {
            return Ok(Resolved {
                key: ImageKey::Content(content_hash(data)),
                data: data.to_vec(),
                hinted: None,
            })
        }
        ImageSource::Src(src) => src,
    };
    if src.is_empty() {
        return Err(FolioError::config("Image file name is empty"));
    }

    // Data URI: data:image/png;base64,iVBOR...
    if let Some(rest) = src.strip_prefix("data:image/") {
        let comma = rest
            .find(',')
            .ok_or_else(|| FolioError::format("Invalid data URI: missing comma"))?;
        let mime = rest[..comma].split(';').next().unwrap_or_default();
        let data = base64_decode(&rest[comma + 1..])?;
        return Ok(Resolved {
            key: ImageKey::Content(content_hash(&data)),
            data,
            hinted: ImageFormat::from_name(mime).ok(),
        });
    }

    let path = Path::new(src);
    if path.is_file() {
        let data = std::fs::read(path)?;
        let hinted = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => Some(ImageFormat::from_name(ext)?),
            None => None,
        };
        return Ok(Resolved {
            key: ImageKey::Path(path.canonicalize()?),
            data,
            hinted,
        });
    }

    // Only fall back to base64 for strings that cannot be a path
    match base64_decode(src) {
        Ok(data) => Ok(Resolved {
            key: ImageKey::Content(content_hash(&data)),
            data,
            hinted: None,
        }),
        Err(_) => Err(FolioError::config(format!("Can't open image file: {}", src))),
    }
}

fn base64_decode(input: &str) -> Result<Vec<u8>> {
    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(input.trim())
        .map_err(|e| FolioError::format(format!("Base64 decode error: {}", e)))
}

fn content_hash(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}

fn is_jpeg(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] == 0xD8
}

fn is_png(data: &[u8]) -> bool {
    data.len() >= 4 && data[0] == 0x89 && data[1] == 0x50 && data[2] == 0x4E && data[3] == 0x47
}

/// Frame header fields of a JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    precision: u8,
    width: u32,
    height: u32,
    components: u8,
}

/// Walk the marker segments up to the first SOF.
fn scan_jpeg_frame(data: &[u8]) -> Option<JpegFrame> {
    let mut i = 2; // skip SOI marker (FF D8)
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            return None;
        }
        let marker = data[i + 1];
        match marker {
            // Fill byte
            0xFF => {
                i += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                i += 2;
                continue;
            }
            _ => {}
        }
        // SOF markers: C0-C3, C5-C7, C9-CB, CD-CF
        if matches!(marker, 0xC0..=0xC3 | 0xC5..=0xC7 | 0xC9..=0xCB | 0xCD..=0xCF) {
            // length(2) + precision(1) + height(2) + width(2) + components(1)
            let seg = data.get(i + 4..i + 10)?;
            return Some(JpegFrame {
                precision: seg[0],
                height: u32::from(u16::from_be_bytes([seg[1], seg[2]])),
                width: u32::from(u16::from_be_bytes([seg[3], seg[4]])),
                components: seg[5],
            });
        }
        let len = data.get(i + 2..i + 4)?;
        i += 2 + u16::from_be_bytes([len[0], len[1]]) as usize;
    }
    None
}

/// JPEG: read dimensions and color space without decoding pixels.
fn decode_jpeg(data: &[u8]) -> Result<ImageInfo> {
    if !is_jpeg(data) {
        return Err(FolioError::format("Not a JPEG file"));
    }
    let frame = scan_jpeg_frame(data)
        .ok_or_else(|| FolioError::format("Missing or incorrect JPEG frame header"))?;
    let color_space = match frame.components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        4 => ColorSpace::DeviceCMYK,
        n => {
            return Err(FolioError::format(format!(
                "Unsupported JPEG channel count: {}",
                n
            )))
        }
    };
    if frame.width == 0 || frame.height == 0 {
        return Err(FolioError::format("JPEG frame has no dimensions"));
    }
    Ok(ImageInfo {
        width: frame.width,
        height: frame.height,
        color_space,
        bits_per_component: frame.precision,
        filter: Some(Filter::DCTDecode),
        decode_parms: None,
        trns: None,
        data: data.to_vec(),
        smask: None,
    })
}

/// GIF: decode, re-encode as PNG and parse that.
fn decode_gif(data: &[u8]) -> Result<ImageInfo> {
    let img = image::load_from_memory_with_format(data, image::ImageFormat::Gif)
        .map_err(|e| FolioError::format(format!("Failed to decode GIF: {}", e)))?;
    let rgba = img.to_rgba8();
    let opaque = rgba.pixels().all(|p| p[3] == 255);
    let img = if opaque {
        image::DynamicImage::ImageRgb8(img.to_rgb8())
    } else {
        image::DynamicImage::ImageRgba8(rgba)
    };

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageOutputFormat::Png)
        .map_err(|e| FolioError::format(format!("Failed to convert GIF: {}", e)))?;
    png::decode(&buf)
}

/// An image registered with a document. `index` is its `/I<n>` number.
#[derive(Debug, Clone)]
pub struct RegisteredImage {
    pub index: usize,
    pub info: ImageInfo,
}

/// Images of a document in registration order, deduplicated by source.
#[derive(Debug, Default)]
pub struct ImageRegistry {
    images: Vec<RegisteredImage>,
    keys: HashMap<ImageKey, usize>,
}

impl ImageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `source` unless it was seen before. The format comes from
    /// `format`, then from the source's extension or MIME type, then from
    /// the magic bytes.
    pub fn load(&mut self, source: ImageSource<'_>, format: Option<ImageFormat>) -> Result<&RegisteredImage> {
        let resolved = resolve(source)?;
        if let Some(&i) = self.keys.get(&resolved.key) {
            debug!("Reusing image /I{}", self.images[i].index);
            return Ok(&self.images[i]);
        }

        let format = format
            .or(resolved.hinted)
            .or_else(|| ImageFormat::detect(&resolved.data))
            .ok_or_else(|| FolioError::config("Image has no extension and no type was specified"))?;
        let info = decode(&resolved.data, format)?;
        let index = self.images.len() + 1;
        debug!(
            "Registered image /I{} ({:?}, {}x{}, {}{})",
            index,
            format,
            info.width,
            info.height,
            info.color_space.name(),
            if info.smask.is_some() { ", alpha" } else { "" }
        );
        self.keys.insert(resolved.key, self.images.len());
        self.images.push(RegisteredImage { index, info });
        Ok(&self.images[index - 1])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredImage> {
        self.images.iter()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Whether any image carries a soft mask.
    pub fn has_alpha(&self) -> bool {
        self.images.iter().any(|img| img.info.smask.is_some())
    }
}
