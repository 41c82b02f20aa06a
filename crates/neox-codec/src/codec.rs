//! The decode capability used by archive readers.

use crate::detection;
use crate::layers;
use crate::{crypto, decompress};
use crate::{Category, CompressionType, DataFlags, EncryptionType, Result};

/// Decode primitives consumed by the entry pipeline.
///
/// Every method has a default implementation backed by this crate, so an
/// implementor only overrides what it needs to replace. Archive readers call
/// these in a fixed order: `decrypt`, `decompress`, the rotor pair, the NXS3
/// pair, then `is_text`, `extension` and `category`.
pub trait Codec: Send + Sync {
    /// Decrypt a raw payload.
    fn decrypt(
        &self,
        data: &[u8],
        kind: EncryptionType,
        key: Option<u32>,
        material: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        crypto::decrypt(data, kind, key, material)
    }

    /// Undo primary compression. `original_length` is the decoded size hint.
    fn decompress(
        &self,
        data: &[u8],
        kind: CompressionType,
        original_length: u32,
    ) -> Result<Vec<u8>> {
        decompress::decompress(data, kind, original_length)
    }

    /// Whether the payload carries a rotor layer.
    fn is_rotor(&self, data: &[u8]) -> bool {
        layers::is_rotor(data)
    }

    /// Strip a rotor layer.
    fn unpack_rotor(&self, data: &[u8]) -> Result<Vec<u8>> {
        layers::unpack_rotor(data)
    }

    /// Whether the payload carries an NXS3 layer.
    fn is_nxs3(&self, data: &[u8]) -> bool {
        layers::is_nxs3(data)
    }

    /// Strip an NXS3 layer.
    fn unpack_nxs3(&self, data: &[u8]) -> Result<Vec<u8>> {
        layers::unpack_nxs3(data)
    }

    /// Whether the decoded content is text.
    fn is_text(&self, data: &[u8]) -> bool {
        !detection::is_binary(data)
    }

    /// Extension (without the dot) for decoded content. May be empty.
    fn extension(&self, data: &[u8], flags: DataFlags) -> String {
        detection::detect_extension(data, flags).to_string()
    }

    /// Category for an extension.
    fn category(&self, extension: &str) -> Category {
        detection::category_for_extension(extension)
    }
}

/// Codec backed by the algorithms in this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardCodec;

impl Codec for StandardCodec {}
