//! Error types for the WPK crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur when working with WPK archives.
///
/// Decode failures of individual entries are not errors; they are recorded
/// in the entry's [`DataFlags`](neox_codec::DataFlags).
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Common library error (truncated or malformed index fields).
    #[error("{0}")]
    Common(#[from] neox_common::Error),

    /// A file of the archive pair could not be opened.
    #[error("cannot open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Unknown compression tag in the index.
    #[error("unsupported compression type {tag} in record {ordinal}")]
    UnsupportedCompression { ordinal: usize, tag: u16 },

    /// Unknown encryption tag in the index.
    #[error("unsupported encryption type {tag} in record {ordinal}")]
    UnsupportedEncryption { ordinal: usize, tag: u16 },

    /// Entry data lies past the end of the data file.
    #[error(
        "entry {ordinal} data out of bounds: {length} bytes at offset {offset:#x}, data file has {available} bytes"
    )]
    EntryOutOfBounds {
        ordinal: usize,
        offset: u32,
        length: u32,
        available: u64,
    },

    /// A bulk operation was cancelled between entries.
    #[error("cancelled after {completed} entries")]
    Cancelled { completed: usize },
}

/// Result type for WPK operations.
pub type Result<T> = std::result::Result<T, Error>;
