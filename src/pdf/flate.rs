//! zlib compression backend.
//!
//! Compiled in with the `deflate` feature. Without it [`deflate`] returns
//! `None` and callers write data uncompressed.

use crate::error::{FolioError, Result};

/// Whether the deflate backend is compiled in.
pub const AVAILABLE: bool = cfg!(feature = "deflate");

#[cfg(feature = "deflate")]
pub fn deflate(data: &[u8]) -> Option<Vec<u8>> {
    Some(miniz_oxide::deflate::compress_to_vec_zlib(data, 6))
}

#[cfg(not(feature = "deflate"))]
pub fn deflate(_data: &[u8]) -> Option<Vec<u8>> {
    None
}

#[cfg(feature = "deflate")]
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib(data)
        .map_err(|e| FolioError::format(format!("Invalid zlib stream: {:?}", e.status)))
}

#[cfg(not(feature = "deflate"))]
pub fn inflate(_data: &[u8]) -> Result<Vec<u8>> {
    Err(FolioError::format("Decompression requires the 'deflate' feature"))
}
