//! WPK archive container and entry resolution.

use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, error, info};
use neox_codec::{Codec, CompressionType, DataFlags, EncryptionType, StandardCodec};
use parking_lot::RwLock;

use crate::cache::EntryCache;
use crate::detect::ArchivePaths;
use crate::entry::ResolvedEntry;
use crate::index::{self, IndexRecord};
use crate::options::ReadOptions;
use crate::{Error, Result};

/// An opened WPK/IDX archive pair.
///
/// The index is parsed eagerly on open. Entry payloads are read and decoded
/// on first access and cached for the lifetime of the archive. The data file
/// is opened for each resolution and closed again afterwards.
pub struct WpkArchive<C = StandardCodec> {
    index_path: PathBuf,
    data_path: PathBuf,
    options: ReadOptions,
    records: RwLock<Vec<IndexRecord>>,
    cache: EntryCache,
    codec: C,
}

impl WpkArchive<StandardCodec> {
    /// Open an archive with the standard codec.
    ///
    /// When `data_path` is `None` the data file is the `.wpk` sibling of the
    /// index.
    pub fn open(
        index_path: impl AsRef<Path>,
        data_path: Option<&Path>,
        options: ReadOptions,
    ) -> Result<Self> {
        Self::open_with_codec(index_path, data_path, options, StandardCodec)
    }

    /// Open an archive from a sniffed path pair.
    pub fn open_paths(paths: ArchivePaths, options: ReadOptions) -> Result<Self> {
        Self::open(&paths.index, Some(&paths.data), options)
    }
}

impl<C: Codec> WpkArchive<C> {
    /// Open an archive with a custom codec.
    pub fn open_with_codec(
        index_path: impl AsRef<Path>,
        data_path: Option<&Path>,
        options: ReadOptions,
        codec: C,
    ) -> Result<Self> {
        let index_path = index_path.as_ref().to_path_buf();
        let data_path = data_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| ArchivePaths::from_index(&index_path).data);

        info!("Opening WPK index: {}", index_path.display());

        let data = fs::read(&index_path).map_err(|source| Error::Open {
            path: index_path.clone(),
            source,
        })?;
        let records = index::parse_index(&data, options.info_size)?;

        info!("Loaded {} index records", records.len());

        Ok(Self {
            index_path,
            data_path,
            options,
            records: RwLock::new(records),
            cache: EntryCache::new(),
            codec,
        })
    }

    #[inline]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    #[inline]
    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    #[inline]
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    #[inline]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Number of records in the index.
    #[inline]
    pub fn record_count(&self) -> usize {
        self.records.read().len()
    }

    /// A copy of the record at `ordinal`.
    pub fn record(&self, ordinal: usize) -> Option<IndexRecord> {
        self.records.read().get(ordinal).cloned()
    }

    /// A copy of all records.
    pub fn records(&self) -> Vec<IndexRecord> {
        self.records.read().clone()
    }

    /// The index file name of a record (without detected extension).
    pub fn filename(&self, ordinal: usize) -> Option<String> {
        self.records.read().get(ordinal).map(|r| r.filename.clone())
    }

    /// Rename a record in the in-memory index.
    ///
    /// Affects entries resolved afterwards; already resolved entries keep
    /// their name. Returns false for an invalid ordinal.
    pub fn rename(&self, ordinal: usize, name: impl Into<String>) -> bool {
        match self.records.write().get_mut(ordinal) {
            Some(record) => {
                record.filename = name.into();
                true
            }
            None => false,
        }
    }

    /// Whether the entry has already been resolved.
    #[inline]
    pub fn is_resolved(&self, ordinal: usize) -> bool {
        self.cache.contains(ordinal)
    }

    /// The cached entry, without resolving it.
    #[inline]
    pub fn cached(&self, ordinal: usize) -> Option<Arc<ResolvedEntry>> {
        self.cache.get(ordinal)
    }

    /// Resolve an entry, reading and decoding it on first access.
    ///
    /// An out-of-range ordinal yields an uncached entry flagged
    /// [`DataFlags::ERROR`]. Decode failures are reported through the
    /// entry's flags. Errors are returned only for unreadable data files and
    /// payloads that lie outside them.
    pub fn resolve(&self, ordinal: usize) -> Result<Arc<ResolvedEntry>> {
        if let Some(entry) = self.cache.get(ordinal) {
            return Ok(entry);
        }

        let Some(record) = self.record(ordinal) else {
            error!(
                "Entry index out of range: {} (archive has {} entries)",
                ordinal,
                self.record_count()
            );
            return Ok(Arc::new(ResolvedEntry::invalid()));
        };

        self.cache
            .get_or_try_insert_with(ordinal, || self.load_entry(ordinal, record))
    }

    fn load_entry(&self, ordinal: usize, record: IndexRecord) -> Result<ResolvedEntry> {
        let data = self.read_payload(ordinal, &record)?;

        let mut entry = ResolvedEntry {
            record,
            data,
            ..Default::default()
        };
        self.decode(&mut entry);

        if !entry.extension.is_empty() {
            entry.record.filename = format!("{}.{}", entry.record.filename, entry.extension);
        }

        debug!(
            "Entry {}: {} ({}, {})",
            ordinal,
            entry.filename(),
            entry.category,
            entry.flags
        );

        Ok(entry)
    }

    fn read_payload(&self, ordinal: usize, record: &IndexRecord) -> Result<Vec<u8>> {
        let mut file = File::open(&self.data_path).map_err(|source| Error::Open {
            path: self.data_path.clone(),
            source,
        })?;

        let available = file.metadata()?.len();
        let end = record.file_offset as u64 + record.file_length as u64;
        if end > available {
            return Err(Error::EntryOutOfBounds {
                ordinal,
                offset: record.file_offset,
                length: record.file_length,
                available,
            });
        }

        file.seek(SeekFrom::Start(record.file_offset as u64))?;
        let mut data = vec![0u8; record.file_length as usize];
        file.read_exact(&mut data)?;

        Ok(data)
    }

    /// Run the decode stages over `entry.data`, recording outcome flags.
    fn decode(&self, entry: &mut ResolvedEntry) {
        let compression = entry.record.compression;
        let encryption = entry.record.encryption;

        if encryption != EncryptionType::None {
            match self.codec.decrypt(
                &entry.data,
                encryption,
                self.options.decryption_key,
                self.options.key_material.as_deref(),
            ) {
                Ok(data) => entry.data = data,
                Err(e) => {
                    self.decode_failed(entry, Stage::Decrypt(encryption), &e);
                    return;
                }
            }
        }

        if compression != CompressionType::None {
            match self
                .codec
                .decompress(&entry.data, compression, entry.record.file_original_length)
            {
                Ok(data) => entry.data = data,
                Err(e) => {
                    self.decode_failed(entry, Stage::Decompress(compression), &e);
                    return;
                }
            }
        }

        if self.codec.is_rotor(&entry.data) {
            entry.flags |= DataFlags::ROTOR_PACKED;
            match self.codec.unpack_rotor(&entry.data) {
                Ok(data) => entry.data = data,
                Err(e) => {
                    error!("Error unpacking rotor layer of {}: {}", entry.filename(), e);
                    entry.flags |= DataFlags::ERROR;
                    return;
                }
            }
        }

        if self.codec.is_nxs3(&entry.data) {
            entry.flags |= DataFlags::NXS3_PACKED;
            match self.codec.unpack_nxs3(&entry.data) {
                Ok(data) => entry.data = data,
                Err(e) => {
                    error!("Error unpacking NXS3 layer of {}: {}", entry.filename(), e);
                    entry.flags |= DataFlags::ERROR;
                    return;
                }
            }
        }

        if self.codec.is_text(&entry.data) {
            entry.flags |= DataFlags::TEXT;
        }

        entry.extension = self.codec.extension(&entry.data, entry.flags);
        entry.category = self.codec.category(&entry.extension);
    }

    /// Flag a decryption or decompression failure.
    ///
    /// With a non-zero key configured the failure most likely means a wrong
    /// key, so the entry is marked ENCRYPTED; otherwise it is marked ERROR.
    fn decode_failed(&self, entry: &mut ResolvedEntry, stage: Stage, err: &neox_codec::Error) {
        if self.options.has_key() {
            error!(
                "Error decoding {} using {}; check decryption key ({})",
                entry.filename(),
                stage,
                err
            );
            entry.flags |= DataFlags::ENCRYPTED;
        } else {
            error!("Error decoding {} using {}: {}", entry.filename(), stage, err);
            entry.flags |= DataFlags::ERROR;
        }
    }
}

/// Primary pipeline stage, for failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Decrypt(EncryptionType),
    Decompress(CompressionType),
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Decrypt(kind) => write!(f, "{kind} decryption"),
            Self::Decompress(kind) => write!(f, "{kind} compression"),
        }
    }
}

impl<C> std::fmt::Debug for WpkArchive<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WpkArchive")
            .field("index_path", &self.index_path)
            .field("data_path", &self.data_path)
            .field("records", &self.records.read().len())
            .field("resolved", &self.cache.len())
            .finish()
    }
}
