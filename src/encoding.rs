//! Single-byte text encoding and PDF string literals.
//!
//! Page text is written in cp1252, the byte encoding behind PDF's
//! `/WinAnsiEncoding`. Document metadata goes through [`text_string`], which
//! falls back to UTF-16BE for anything outside ASCII.

/// Unicode values of cp1252 codes 0x80..=0x9F. `None` marks the five
/// undefined codes.
const CP1252_HIGH: [Option<u16>; 32] = [
    Some(0x20AC), None, Some(0x201A), Some(0x0192), Some(0x201E), Some(0x2026), Some(0x2020), Some(0x2021),
    Some(0x02C6), Some(0x2030), Some(0x0160), Some(0x2039), Some(0x0152), None, Some(0x017D), None,
    None, Some(0x2018), Some(0x2019), Some(0x201C), Some(0x201D), Some(0x2022), Some(0x2013), Some(0x2014),
    Some(0x02DC), Some(0x2122), Some(0x0161), Some(0x203A), Some(0x0153), None, Some(0x017E), Some(0x0178),
];

/// The character a cp1252 byte stands for.
pub fn cp1252_to_unicode(code: u8) -> Option<char> {
    match code {
        0x80..=0x9F => CP1252_HIGH[(code - 0x80) as usize].and_then(|u| char::from_u32(u32::from(u))),
        _ => Some(code as char),
    }
}

/// The cp1252 byte for a character, if it has one.
pub fn unicode_to_cp1252(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if cp < 0x80 || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    CP1252_HIGH
        .iter()
        .position(|&u| u.map(u32::from) == Some(cp))
        .map(|i| 0x80 + i as u8)
}

/// Encode text for a single-byte font. Characters outside cp1252 become `?`.
pub fn encode_cp1252(text: &str) -> Vec<u8> {
    text.chars().map(|c| unicode_to_cp1252(c).unwrap_or(b'?')).collect()
}

/// Escape the bytes that are special inside a PDF literal string.
pub fn escape(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    for &b in data {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }
    out
}

/// A complete `(...)` literal for metadata and URIs.
pub fn text_string(s: &str) -> Vec<u8> {
    let raw = if s.is_ascii() {
        s.as_bytes().to_vec()
    } else {
        utf16be_with_bom(s)
    };
    let mut out = Vec::with_capacity(raw.len() + 2);
    out.push(b'(');
    out.extend_from_slice(&escape(&raw));
    out.push(b')');
    out
}

pub fn utf16be_with_bom(s: &str) -> Vec<u8> {
    let mut out = vec![0xFE, 0xFF];
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out
}
