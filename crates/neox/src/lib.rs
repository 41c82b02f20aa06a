//! NeoX - game archive extraction library.
//!
//! This crate bundles the NeoX crates behind a single dependency.
//!
//! # Crates
//!
//! - [`neox_common`] - Binary reading helpers and shared errors
//! - [`neox_codec`] - Decryption, decompression, packing layers and content detection
//! - [`neox_wpk`] - WPK/IDX archive reading and extraction
//!
//! # Example
//!
//! ```no_run
//! use neox::prelude::*;
//!
//! let archive = WpkArchive::open("res.idx", None, ReadOptions::new())?;
//!
//! let textures = archive.filter(&EntryFilter::new().with_category(Category::Texture))?;
//! for ordinal in textures {
//!     let entry = archive.resolve(ordinal)?;
//!     println!("{} ({} bytes)", entry.filename(), entry.data().len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use neox_codec as codec;
pub use neox_common as common;
pub use neox_wpk as wpk;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use neox_codec::{
        Category, Codec, CompressionType, DataFlags, EncryptionType, StandardCodec,
    };
    pub use neox_common::BinaryReader;
    pub use neox_wpk::{
        ArchivePaths, EntryFilter, FileKind, IndexRecord, ReadOptions, ResolvedEntry, WpkArchive,
    };
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
