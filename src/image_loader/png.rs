//! # PNG Chunk Decoder
//!
//! Reads a PNG far enough to embed it: the header, palette, transparency and
//! the concatenated `IDAT` stream. Images without an alpha channel keep their
//! zlib data as-is and let the viewer undo the PNG row filters through
//! `/DecodeParms`.
//!
//! Gray+alpha and RGB+alpha have no direct PDF equivalent. Their rows are
//! inflated and unfiltered, then split into a color plane and an alpha plane
//! that are deflated separately. The alpha plane becomes the `/SMask`.

use std::io::Cursor;

use super::{ColorSpace, Filter, ImageInfo};
use crate::error::{FolioError, Result};
use crate::font::reader::TableReader;
use crate::pdf::flate;

const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Decode a PNG stream into an embeddable image.
pub fn decode(data: &[u8]) -> Result<ImageInfo> {
    let mut r = TableReader::new(Cursor::new(data));
    if r.read_bytes(8)? != SIGNATURE {
        return Err(FolioError::format("Not a PNG file"));
    }

    // IHDR
    r.skip(4)?;
    if &r.read_tag()? != b"IHDR" {
        return Err(FolioError::format("Incorrect PNG file"));
    }
    let width = r.read_u32()?;
    let height = r.read_u32()?;
    if width == 0 || height == 0 {
        return Err(FolioError::format(format!("Invalid PNG dimensions {}x{}", width, height)));
    }
    let bpc = r.read_u8()?;
    if bpc > 8 {
        return Err(FolioError::format("16-bit depth not supported"));
    }
    let color_type = r.read_u8()?;
    if !matches!(color_type, 0 | 2 | 3 | 4 | 6) {
        return Err(FolioError::format(format!("Unknown color type: {}", color_type)));
    }
    if r.read_u8()? != 0 {
        return Err(FolioError::format("Unknown compression method"));
    }
    if r.read_u8()? != 0 {
        return Err(FolioError::format("Unknown filter method"));
    }
    if r.read_u8()? != 0 {
        return Err(FolioError::format("Interlacing not supported"));
    }
    r.skip(4)?; // CRC

    let mut palette = Vec::new();
    let mut trns = None;
    let mut idat = Vec::new();
    loop {
        let len = r.read_u32()? as usize;
        let tag = r.read_tag()?;
        match &tag {
            b"PLTE" => palette = r.read_bytes(len)?,
            b"tRNS" => trns = color_key(color_type, &r.read_bytes(len)?)?,
            b"IDAT" => idat.extend_from_slice(&r.read_bytes(len)?),
            b"IEND" => break,
            _ => r.skip(len as i64)?,
        }
        r.skip(4)?; // CRC
    }

    let color_space = match color_type {
        0 | 4 => ColorSpace::DeviceGray,
        2 | 6 => ColorSpace::DeviceRGB,
        _ if palette.is_empty() => return Err(FolioError::format("Missing palette in indexed PNG")),
        _ => ColorSpace::Indexed { palette },
    };

    if color_type < 4 {
        let colors = if color_type == 2 { 3 } else { 1 };
        return Ok(ImageInfo {
            width,
            height,
            color_space,
            bits_per_component: bpc,
            filter: Some(Filter::FlateDecode),
            decode_parms: Some(format!(
                "/Predictor 15 /Colors {} /BitsPerComponent {} /Columns {}",
                colors, bpc, width
            )),
            trns,
            data: idat,
            smask: None,
        });
    }

    // Alpha channel: 8-bit samples, one alpha byte per pixel
    let bpp = if color_type == 4 { 2 } else { 4 };
    let raw = flate::inflate(&idat)?;
    let pixels = unfilter(&raw, width as usize, height as usize, bpp)?;
    let mut color = Vec::with_capacity(pixels.len() / bpp * (bpp - 1));
    let mut alpha = Vec::with_capacity(pixels.len() / bpp);
    for px in pixels.chunks_exact(bpp) {
        color.extend_from_slice(&px[..bpp - 1]);
        alpha.push(px[bpp - 1]);
    }
    let (Some(color), Some(alpha)) = (flate::deflate(&color), flate::deflate(&alpha)) else {
        return Err(FolioError::format("Alpha channel PNGs require the 'deflate' feature"));
    };

    Ok(ImageInfo {
        width,
        height,
        color_space,
        bits_per_component: 8,
        filter: Some(Filter::FlateDecode),
        decode_parms: None,
        trns,
        data: color,
        smask: Some(alpha),
    })
}

/// The `/Mask` color key for a `tRNS` chunk. Palette images use the first
/// fully transparent entry.
fn color_key(color_type: u8, t: &[u8]) -> Result<Option<Vec<u8>>> {
    let low_byte = |i: usize| {
        t.get(i)
            .copied()
            .ok_or_else(|| FolioError::format("Truncated tRNS chunk"))
    };
    Ok(match color_type {
        0 => Some(vec![low_byte(1)?]),
        2 => Some(vec![low_byte(1)?, low_byte(3)?, low_byte(5)?]),
        _ => t.iter().position(|&a| a == 0).map(|i| vec![i as u8]),
    })
}

/// Reverse the per-row PNG filters and return bare pixel rows.
fn unfilter(data: &[u8], width: usize, height: usize, bpp: usize) -> Result<Vec<u8>> {
    let stride = width * bpp;
    if data.len() < height * (stride + 1) {
        return Err(FolioError::format(format!(
            "PNG image data is too short: {} bytes for {} rows of {}",
            data.len(),
            height,
            stride + 1
        )));
    }
    let mut out = vec![0u8; height * stride];
    for row in 0..height {
        let line = &data[row * (stride + 1)..(row + 1) * (stride + 1)];
        let (filter, src) = (line[0], &line[1..]);
        let (done, rest) = out.split_at_mut(row * stride);
        let prev = if row > 0 { &done[(row - 1) * stride..] } else { &[][..] };
        let cur = &mut rest[..stride];
        for i in 0..stride {
            let a = if i >= bpp { cur[i - bpp] } else { 0 };
            let b = prev.get(i).copied().unwrap_or(0);
            let c = if i >= bpp { prev.get(i - bpp).copied().unwrap_or(0) } else { 0 };
            cur[i] = match filter {
                0 => src[i],
                1 => src[i].wrapping_add(a),
                2 => src[i].wrapping_add(b),
                3 => src[i].wrapping_add(((u16::from(a) + u16::from(b)) / 2) as u8),
                4 => src[i].wrapping_add(paeth(a, b, c)),
                other => return Err(FolioError::format(format!("Unknown PNG row filter {}", other))),
            };
        }
    }
    Ok(out)
}

fn paeth(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

#[cfg(all(test, feature = "deflate"))]
mod tests {
    use super::*;
    use image::codecs::png::{CompressionType, FilterType, PngEncoder};
    use image::{ColorType, ImageEncoder};

    fn encode(raw: &[u8], width: u32, height: u32, color: ColorType, filter: FilterType) -> Vec<u8> {
        let mut buf = Vec::new();
        let encoder = PngEncoder::new_with_quality(&mut buf, CompressionType::Default, filter);
        encoder.write_image(raw, width, height, color).unwrap();
        buf
    }

    fn crc32(bytes: &[u8]) -> u32 {
        let mut crc = 0xFFFF_FFFFu32;
        for &b in bytes {
            crc ^= u32::from(b);
            for _ in 0..8 {
                crc = if crc & 1 != 0 { (crc >> 1) ^ 0xEDB8_8320 } else { crc >> 1 };
            }
        }
        !crc
    }

    /// A PNG assembled chunk by chunk.
    fn chunked(ihdr: [u8; 13], chunks: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
        let mut out = SIGNATURE.to_vec();
        let mut push = |tag: &[u8; 4], body: &[u8]| {
            out.extend_from_slice(&(body.len() as u32).to_be_bytes());
            let start = out.len();
            out.extend_from_slice(tag);
            out.extend_from_slice(body);
            let crc = crc32(&out[start..]);
            out.extend_from_slice(&crc.to_be_bytes());
        };
        push(b"IHDR", &ihdr);
        for (tag, body) in chunks {
            push(tag, body);
        }
        push(b"IEND", &[]);
        out
    }

    fn ihdr(width: u32, height: u32, depth: u8, color_type: u8) -> [u8; 13] {
        let mut h = [0u8; 13];
        h[..4].copy_from_slice(&width.to_be_bytes());
        h[4..8].copy_from_slice(&height.to_be_bytes());
        h[8] = depth;
        h[9] = color_type;
        h
    }

    #[test]
    fn test_rgba_splits_into_color_and_alpha() {
        let raw: Vec<u8> = (0..100u32)
            .flat_map(|i| [i as u8, (i * 2) as u8, (i * 3) as u8, (255 - i) as u8])
            .collect();
        let png = encode(&raw, 10, 10, ColorType::Rgba8, FilterType::Adaptive);
        let info = decode(&png).unwrap();
        assert_eq!(info.color_space, ColorSpace::DeviceRGB);
        assert_eq!(info.bits_per_component, 8);
        assert!(info.decode_parms.is_none());

        let color = flate::inflate(&info.data).unwrap();
        let alpha = flate::inflate(info.smask.as_ref().unwrap()).unwrap();
        assert_eq!(color.len(), 300);
        assert_eq!(alpha.len(), 100);
        assert_eq!(&color[..6], &[0, 0, 0, 1, 2, 3]);
        assert_eq!(alpha[99], 156);
    }

    #[test]
    fn test_every_row_filter_is_reversed() {
        let raw: Vec<u8> = (0..64u32)
            .flat_map(|i| [(i * 7) as u8, (i * 13 + 5) as u8, 255 - i as u8, (i * 31) as u8])
            .collect();
        let expected: Vec<u8> = raw.chunks(4).flat_map(|px| px[..3].to_vec()).collect();
        for filter in [FilterType::NoFilter, FilterType::Sub, FilterType::Up, FilterType::Avg, FilterType::Paeth] {
            let png = encode(&raw, 8, 8, ColorType::Rgba8, filter);
            let info = decode(&png).unwrap();
            assert_eq!(flate::inflate(&info.data).unwrap(), expected, "{:?}", filter);
        }
    }

    #[test]
    fn test_gray_alpha() {
        let raw = [10u8, 255, 20, 128, 30, 0, 40, 64];
        let png = encode(&raw, 2, 2, ColorType::La8, FilterType::Sub);
        let info = decode(&png).unwrap();
        assert_eq!(info.color_space, ColorSpace::DeviceGray);
        assert_eq!(flate::inflate(&info.data).unwrap(), vec![10, 20, 30, 40]);
        assert_eq!(flate::inflate(info.smask.as_ref().unwrap()).unwrap(), vec![255, 128, 0, 64]);
    }

    #[test]
    fn test_rgb_keeps_idat_with_predictor() {
        let raw = [255u8, 0, 0, 0, 255, 0, 0, 0, 255, 9, 9, 9];
        let png = encode(&raw, 2, 2, ColorType::Rgb8, FilterType::Up);
        let info = decode(&png).unwrap();
        assert_eq!(
            info.decode_parms.as_deref(),
            Some("/Predictor 15 /Colors 3 /BitsPerComponent 8 /Columns 2")
        );
        assert!(info.smask.is_none());
        // Filtered rows with their filter bytes
        assert_eq!(flate::inflate(&info.data).unwrap().len(), 2 * (1 + 6));
    }

    #[test]
    fn test_palette_and_transparency() {
        let rows = vec![0u8, 0x01];
        let idat = flate::deflate(&rows).unwrap();
        let png = chunked(
            ihdr(2, 1, 4, 3),
            &[
                (b"PLTE", vec![255, 0, 0, 0, 0, 255]),
                (b"tRNS", vec![255, 0]),
                (b"IDAT", idat),
            ],
        );
        let info = decode(&png).unwrap();
        assert_eq!(info.color_space, ColorSpace::Indexed { palette: vec![255, 0, 0, 0, 0, 255] });
        assert_eq!(info.bits_per_component, 4);
        assert_eq!(info.trns, Some(vec![1]));
        assert_eq!(
            info.decode_parms.as_deref(),
            Some("/Predictor 15 /Colors 1 /BitsPerComponent 4 /Columns 2")
        );
    }

    #[test]
    fn test_color_key_for_gray_and_rgb() {
        assert_eq!(color_key(0, &[0, 7]).unwrap(), Some(vec![7]));
        assert_eq!(color_key(2, &[0, 1, 0, 2, 0, 3]).unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(color_key(3, &[255, 255]).unwrap(), None);
        assert!(color_key(2, &[0, 1]).is_err());
    }

    #[test]
    fn test_unknown_chunks_are_skipped() {
        let idat = flate::deflate(&[0u8, 42]).unwrap();
        let png = chunked(
            ihdr(1, 1, 8, 0),
            &[(b"tEXt", b"Comment\0hi".to_vec()), (b"IDAT", idat.clone())],
        );
        let info = decode(&png).unwrap();
        assert_eq!(info.data, idat);
    }

    #[test]
    fn test_structural_errors() {
        let idat = flate::deflate(&[0u8, 0]).unwrap();
        let cases: [(&[u8; 13], &str); 4] = [
            (&ihdr(1, 1, 16, 2), "16-bit"),
            (&ihdr(1, 1, 8, 5), "color type"),
            (&ihdr(1, 1, 8, 3), "Missing palette"),
            (&[0, 0, 0, 1, 0, 0, 0, 1, 8, 0, 0, 0, 1], "Interlacing"),
        ];
        for (header, message) in cases {
            let png = chunked(*header, &[(b"IDAT", idat.clone())]);
            let err = decode(&png).unwrap_err();
            assert!(matches!(err, FolioError::Format(_)));
            assert!(err.to_string().contains(message), "{} vs {}", err, message);
        }
        assert!(decode(b"GIF89a....").is_err());
        assert!(decode(&SIGNATURE).is_err());
    }

    #[test]
    fn test_indexed_round_trip_keeps_palette_and_raster() {
        let palette: Vec<u8> = vec![0, 0, 0, 200, 10, 10, 10, 200, 10, 250, 250, 250];
        let rows = vec![0u8, 0, 1, 2, 3, 0, 3, 2, 1, 0];
        let png = chunked(
            ihdr(4, 2, 8, 3),
            &[(b"PLTE", palette.clone()), (b"IDAT", flate::deflate(&rows).unwrap())],
        );
        let info = decode(&png).unwrap();

        // Write the decoded parts back out as a PNG
        let ColorSpace::Indexed { palette: decoded_palette } = &info.color_space else {
            panic!("expected an indexed image");
        };
        let again = chunked(
            ihdr(info.width, info.height, info.bits_per_component, 3),
            &[(b"PLTE", decoded_palette.clone()), (b"IDAT", info.data.clone())],
        );
        let reparsed = decode(&again).unwrap();
        assert_eq!(reparsed.color_space, info.color_space);
        assert_eq!(decoded_palette.len() / 3, 4);

        // Both rasters expand to the same pixels
        let expand = |png: &[u8]| image::load_from_memory(png).unwrap().to_rgb8().into_raw();
        assert_eq!(expand(&png), expand(&again));
    }
}
