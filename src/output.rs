//! Where a finished document goes, and the HTTP headers for serving it.

use std::path::PathBuf;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Delivery target for [`crate::Document::output`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Shown in the browser, with a file name for "save as".
    Inline(String),
    /// Sent as an attachment.
    Download(String),
    /// Written to a local file.
    File(PathBuf),
    /// Only returned.
    Memory,
}

impl Default for Destination {
    fn default() -> Self {
        Destination::Inline("doc.pdf".to_string())
    }
}

/// RFC 5987 `attr-char` minus the characters we leave alone.
const FILENAME: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Response headers for sending `len` bytes of PDF to a browser.
/// Returns nothing for `File` and `Memory`.
pub fn http_headers(dest: &Destination, len: usize) -> Vec<(&'static str, String)> {
    let (disposition, name) = match dest {
        Destination::Inline(name) => ("inline", name),
        Destination::Download(name) => ("attachment", name),
        Destination::File(_) | Destination::Memory => return Vec::new(),
    };
    vec![
        ("Content-Type", "application/pdf".to_string()),
        ("Content-Disposition", content_disposition(disposition, name)),
        ("Content-Length", len.to_string()),
        ("Cache-Control", "private, max-age=0, must-revalidate".to_string()),
        ("Pragma", "public".to_string()),
    ]
}

fn content_disposition(disposition: &str, name: &str) -> String {
    if name.is_ascii() {
        let quoted = name.replace('\\', "\\\\").replace('"', "\\\"");
        format!("{}; filename=\"{}\"", disposition, quoted)
    } else {
        let fallback: String = name.chars().map(|c| if c.is_ascii() { c } else { '_' }).collect();
        format!(
            "{}; filename=\"{}\"; filename*=UTF-8''{}",
            disposition,
            fallback.replace('"', "_"),
            utf8_percent_encode(name, FILENAME)
        )
    }
}
