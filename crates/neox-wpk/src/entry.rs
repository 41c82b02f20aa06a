//! Resolved archive entries.

use std::fs;
use std::io;
use std::path::Path;

use neox_codec::{Category, DataFlags};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::index::IndexRecord;

/// An index record together with its decoded content and outcome flags.
///
/// Entries own their bytes and stay valid after the archive is dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct ResolvedEntry {
    /// The record this entry was resolved from. The file name carries the
    /// detected extension as a suffix.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub record: IndexRecord,
    /// Decoded content, or the bytes reached before a failing stage.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub data: Vec<u8>,
    /// Detected extension without the dot. Empty when undetected.
    pub extension: String,
    /// Category derived from the extension.
    pub category: Category,
    /// Pipeline outcome.
    pub flags: DataFlags,
}

impl ResolvedEntry {
    /// Placeholder returned for an ordinal outside the table.
    pub fn invalid() -> Self {
        Self {
            flags: DataFlags::ERROR,
            ..Default::default()
        }
    }

    #[inline]
    pub fn filename(&self) -> &str {
        &self.record.filename
    }

    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.record.is_compressed()
    }

    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.record.is_encrypted()
    }

    /// Decoding failed or the ordinal was invalid.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.flags.contains(DataFlags::ERROR)
    }

    /// Decoding failed while a key was configured (likely a wrong key).
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.flags.contains(DataFlags::ENCRYPTED)
    }

    /// Content was judged to be text.
    #[inline]
    pub fn is_text(&self) -> bool {
        self.flags.contains(DataFlags::TEXT)
    }

    /// Name for listings, with a suffix for failed entries.
    pub fn display_label(&self) -> String {
        if self.has_error() {
            format!("{} (Error)", self.filename())
        } else if self.is_locked() {
            format!("{} (Encrypted)", self.filename())
        } else {
            self.filename().to_string()
        }
    }

    /// Write the content to `path`, creating parent directories.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, &self.data)
    }
}
