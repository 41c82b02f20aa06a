//! Error types for the codec crate.

use thiserror::Error;

use crate::{CompressionType, EncryptionType};

/// Errors produced by the decode primitives.
#[derive(Debug, Error)]
pub enum Error {
    /// Common library error.
    #[error("{0}")]
    Common(#[from] neox_common::Error),

    /// The entry needs a key that was not supplied.
    #[error("missing key for {0} decryption")]
    MissingKey(EncryptionType),

    /// Decryption error.
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Decompression error.
    #[error("{kind} decompression error: {reason}")]
    Decompression {
        kind: CompressionType,
        reason: String,
    },

    /// Decoded size does not match the size recorded in the index.
    ///
    /// Decoding stops one byte past `expected`, so an oversized stream
    /// reports `expected + 1`.
    #[error("decoded size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// A secondary layer signature was present but the body is malformed.
    #[error("{layer} layer error: {reason}")]
    Layer { layer: &'static str, reason: String },
}

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
