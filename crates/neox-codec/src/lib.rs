//! Decode primitives for NeoX game archives.
//!
//! Entries stored in WPK (and NPK) archives pass through a fixed sequence of
//! transforms on their way out of the data file:
//!
//! - decryption (XOR keystream or AES-128-CBC)
//! - primary decompression (zlib, LZ4 block, Zstandard)
//! - optional secondary layers detected by signature (rotor, NXS3)
//! - content classification (text/binary, extension, category)
//!
//! The [`Codec`] trait bundles these primitives so archive readers can drive
//! the pipeline without depending on the concrete algorithms.
//! [`StandardCodec`] uses the implementations in this crate.
//!
//! # Example
//!
//! ```
//! use neox_codec::{Codec, DataFlags, StandardCodec};
//!
//! let codec = StandardCodec;
//! let data = b"<?xml version=\"1.0\"?><root/>";
//! assert!(codec.is_text(data));
//! assert_eq!(codec.extension(data, DataFlags::TEXT), "xml");
//! ```

mod codec;
mod error;
mod types;

pub mod crypto;
pub mod decompress;
pub mod detection;
pub mod layers;

pub use codec::{Codec, StandardCodec};
pub use error::{Error, Result};
pub use types::{Category, CompressionType, DataFlags, EncryptionType};
