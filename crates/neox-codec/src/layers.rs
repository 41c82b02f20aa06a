//! Secondary packing layers.
//!
//! Some payloads are wrapped once more after primary decompression. The
//! wrapper is not recorded in the index; it is recognised by its signature.
//!
//! Rotor layout:
//!
//! ```text
//! 1D 04 00 00      signature
//! u32 (LE)         decoded length
//! u8[..]           zlib stream, XOR-masked with the rotor pad
//! ```
//!
//! NXS3 layout:
//!
//! ```text
//! "NXS3" 03 00 00 01   signature
//! u32 (LE)             decoded length
//! u8[..]               LZ4 block
//! ```

use std::io::Read;

use flate2::read::ZlibDecoder;
use neox_common::BinaryReader;

use crate::{Error, Result};

/// Rotor layer signature.
pub const ROTOR_MAGIC: [u8; 4] = [0x1D, 0x04, 0x00, 0x00];

/// NXS3 layer signature.
pub const NXS3_MAGIC: [u8; 8] = [b'N', b'X', b'S', b'3', 0x03, 0x00, 0x00, 0x01];

const ROTOR_PAD: [u8; 8] = [0x6B, 0x3F, 0xA1, 0x52, 0xC4, 0x0D, 0x97, 0xE8];

/// Check whether data starts with the rotor signature.
#[inline]
pub fn is_rotor(data: &[u8]) -> bool {
    data.starts_with(&ROTOR_MAGIC)
}

/// Check whether data starts with the NXS3 signature.
#[inline]
pub fn is_nxs3(data: &[u8]) -> bool {
    data.starts_with(&NXS3_MAGIC)
}

/// Apply the rotor mask in place. The mask is its own inverse.
///
/// Byte `i` is XORed with pad byte `i % 8`, rotated left by `(i / 8) % 8`.
pub fn rotor_mask(data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        let rotation = ((i / ROTOR_PAD.len()) % 8) as u32;
        *byte ^= ROTOR_PAD[i % ROTOR_PAD.len()].rotate_left(rotation);
    }
}

/// Strip a rotor layer.
pub fn unpack_rotor(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::new(data);
    reader.expect_magic(&ROTOR_MAGIC)?;
    let expected = reader.read_u32()? as usize;

    let mut body = reader.remaining_bytes().to_vec();
    rotor_mask(&mut body);

    // The declared length bounds the decoder even when it is zero.
    let mut output = Vec::with_capacity(expected.min(body.len().saturating_mul(16)));
    ZlibDecoder::new(body.as_slice())
        .take(expected as u64 + 1)
        .read_to_end(&mut output)
        .map_err(|e| layer_error("rotor", e))?;

    if output.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: output.len(),
        });
    }

    Ok(output)
}

/// Strip an NXS3 layer.
pub fn unpack_nxs3(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::new(data);
    reader.expect_magic(&NXS3_MAGIC)?;
    let expected = reader.read_u32()? as usize;

    let output = lz4_flex::block::decompress(reader.remaining_bytes(), expected)
        .map_err(|e| layer_error("nxs3", e))?;

    if output.len() != expected {
        return Err(Error::SizeMismatch {
            expected,
            actual: output.len(),
        });
    }

    Ok(output)
}

fn layer_error(layer: &'static str, err: impl std::fmt::Display) -> Error {
    Error::Layer {
        layer,
        reason: err.to_string(),
    }
}
