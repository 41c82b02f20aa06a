//! Archive file sniffing and index/data path pairing.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Signature at the start of index files.
pub const IDX_MAGIC: [u8; 4] = *b"IDX\0";

/// Signature at the start of data files.
pub const WPK_MAGIC: [u8; 4] = *b"WPK\0";

const SIGNATURE_LEN: usize = if IDX_MAGIC.len() > WPK_MAGIC.len() {
    IDX_MAGIC.len()
} else {
    WPK_MAGIC.len()
};

/// Kind of file recognised from its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.idx` index file.
    Index,
    /// `.wpk` data file.
    Data,
    /// Too short, or neither signature.
    Unknown,
}

/// Classify a file from its leading bytes.
pub fn detect_bytes(header: &[u8]) -> FileKind {
    if header.starts_with(&IDX_MAGIC) {
        FileKind::Index
    } else if header.starts_with(&WPK_MAGIC) {
        FileKind::Data
    } else {
        FileKind::Unknown
    }
}

/// Classify a file on disk. Reads at most the signature prefix.
pub fn detect_file(path: impl AsRef<Path>) -> Result<FileKind> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut header = Vec::with_capacity(SIGNATURE_LEN);
    file.take(SIGNATURE_LEN as u64).read_to_end(&mut header)?;

    Ok(detect_bytes(&header))
}

/// Paths of an index/data pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePaths {
    pub index: PathBuf,
    pub data: PathBuf,
}

impl ArchivePaths {
    /// Pair up the files of an archive from user-supplied paths.
    ///
    /// - `path` is a data file: the index is its `.idx` sibling.
    /// - `path` is an index file and no companion was given: the data file is
    ///   its `.wpk` sibling.
    /// - the companion sniffs as an index file: the two are swapped.
    /// - otherwise the paths are taken as given.
    ///
    /// Siblings are derived by extension substitution only.
    pub fn resolve(path: impl AsRef<Path>, companion: Option<&Path>) -> Result<Self> {
        let path = path.as_ref();

        let kind = detect_file(path)?;

        if kind == FileKind::Data {
            return Ok(Self {
                index: path.with_extension("idx"),
                data: path.to_path_buf(),
            });
        }

        let Some(companion) = companion else {
            return Ok(Self::from_index(path));
        };

        if detect_file(companion)? == FileKind::Index {
            return Ok(Self {
                index: companion.to_path_buf(),
                data: path.to_path_buf(),
            });
        }

        Ok(Self {
            index: path.to_path_buf(),
            data: companion.to_path_buf(),
        })
    }

    /// Index path plus its `.wpk` sibling.
    pub fn from_index(index: impl AsRef<Path>) -> Self {
        let index = index.as_ref();
        Self {
            index: index.to_path_buf(),
            data: index.with_extension("wpk"),
        }
    }
}
