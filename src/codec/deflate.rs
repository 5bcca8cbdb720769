//! Deflate pass for compressed payloads.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::{Error, Result};

/// Compresses raw bytes with deflate at the given level (0-9).
pub fn compress(raw: &[u8], level: u32) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::new(level.min(9)));
    // Writing to a Vec cannot fail
    encoder.write_all(raw).expect("write to Vec");
    encoder.finish().expect("finish to Vec")
}

/// Decompresses a deflate stream.
///
/// # Errors
///
/// Returns [`Error::Decode`] when the stream is truncated or corrupt.
pub fn decompress(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(compressed);
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| Error::decode_bare(format!("corrupt deflate stream: {}", e)))?;
    Ok(raw)
}
