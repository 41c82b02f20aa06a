//! WPK/IDX archive reader for NeoX game files.
//!
//! A WPK archive is a pair of files: an index (`.idx`) listing every stored
//! item and a data file (`.wpk`) holding the payloads back to back. Each
//! payload may be:
//!
//! - encrypted (XOR keystream or AES-128-CBC)
//! - compressed (zlib, LZ4, Zstandard)
//! - wrapped in rotor and/or NXS3 layers, detected by signature
//!
//! The index is parsed when the archive is opened. Entries are decoded on
//! first access and cached. Decode failures do not abort anything: they are
//! recorded per entry as [`DataFlags::ERROR`] or, when a decryption key was
//! supplied, [`DataFlags::ENCRYPTED`].
//!
//! # Example
//!
//! ```no_run
//! use neox_wpk::{ArchivePaths, ReadOptions, WpkArchive};
//!
//! let paths = ArchivePaths::resolve("res.wpk", None)?;
//! let archive = WpkArchive::open_paths(paths, ReadOptions::new().with_key(0x45))?;
//!
//! for ordinal in 0..archive.record_count() {
//!     let entry = archive.resolve(ordinal)?;
//!     println!("{} [{}] {}", entry.display_label(), entry.category, entry.flags);
//! }
//!
//! archive.extract_all("out")?;
//! # Ok::<(), neox_wpk::Error>(())
//! ```

mod archive;
mod cache;
mod entry;
mod error;
mod extract;
mod filter;
mod options;

pub mod detect;
pub mod index;

pub use archive::WpkArchive;
pub use cache::EntryCache;
pub use detect::{detect_bytes, detect_file, ArchivePaths, FileKind};
pub use entry::ResolvedEntry;
pub use error::{Error, Result};
pub use extract::output_path;
pub use filter::EntryFilter;
pub use index::IndexRecord;
pub use options::ReadOptions;

pub use neox_codec::{Category, Codec, CompressionType, DataFlags, EncryptionType, StandardCodec};
