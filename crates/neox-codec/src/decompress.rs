//! Primary decompression for archive entries.

use std::io::Read;

use flate2::read::ZlibDecoder;
use log::trace;

use crate::{CompressionType, Error, Result};

/// Decompress an entry payload.
///
/// `original_length` is the decoded size recorded in the index. LZ4 blocks
/// need it to size the output. For the other kinds a non-zero value bounds
/// the decoder and is checked against the decoded length.
pub fn decompress(data: &[u8], kind: CompressionType, original_length: u32) -> Result<Vec<u8>> {
    let expected = original_length as usize;
    trace!(
        "Decompressing with {}: {} bytes -> {} bytes (expected)",
        kind,
        data.len(),
        expected
    );

    let output = match kind {
        CompressionType::None => return Ok(data.to_vec()),
        CompressionType::Zlib => decompress_zlib(data, expected)?,
        CompressionType::Lz4 => decompress_lz4(data, expected)?,
        CompressionType::Zstd => decompress_zstd(data, expected)?,
    };

    if expected != 0 && output.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: output.len(),
        });
    }

    Ok(output)
}

/// Largest buffer reserved up front from a size taken from the archive.
const MAX_PREALLOC: usize = 16 * 1024 * 1024;

/// Read a decoder to its end, stopping one byte past `expected_size`.
///
/// With `expected_size == 0` the stream is read in full. Otherwise at most
/// `expected_size + 1` bytes are produced, which is enough for the caller to
/// see an oversized stream without decoding the rest of it.
pub fn read_bounded<R: Read>(mut decoder: R, expected_size: usize) -> std::io::Result<Vec<u8>> {
    let mut output = Vec::with_capacity(expected_size.min(MAX_PREALLOC));
    if expected_size == 0 {
        decoder.read_to_end(&mut output)?;
    } else {
        decoder.take(expected_size as u64 + 1).read_to_end(&mut output)?;
    }
    Ok(output)
}

/// Decompress a zlib stream, bounded by `expected_size` when non-zero.
pub fn decompress_zlib(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    read_bounded(ZlibDecoder::new(data), expected_size)
        .map_err(|e| decompression_error(CompressionType::Zlib, e))
}

/// Decompress a Zstandard frame, bounded by `expected_size` when non-zero.
pub fn decompress_zstd(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let decoder =
        zstd::Decoder::new(data).map_err(|e| decompression_error(CompressionType::Zstd, e))?;

    read_bounded(decoder, expected_size).map_err(|e| decompression_error(CompressionType::Zstd, e))
}

/// Decompress a raw LZ4 block into exactly `expected_size` bytes.
pub fn decompress_lz4(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    if expected_size == 0 {
        return Err(Error::Decompression {
            kind: CompressionType::Lz4,
            reason: "LZ4 block needs a decoded size".to_string(),
        });
    }

    lz4_flex::block::decompress(data, expected_size)
        .map_err(|e| decompression_error(CompressionType::Lz4, e))
}

fn decompression_error(kind: CompressionType, err: impl std::fmt::Display) -> Error {
    Error::Decompression {
        kind,
        reason: err.to_string(),
    }
}
