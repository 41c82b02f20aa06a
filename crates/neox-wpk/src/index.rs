//! Index table parsing.
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! [info header]    optional, see below
//! u32              record count
//! record[count]:
//!   u32            file offset
//!   u32            file length
//!   u32            original length
//!   u16            compression tag
//!   u16            encryption tag
//!   u16            name length
//!   u8[name len]   UTF-8 file name
//! ```
//!
//! The info header is `info_size` bytes when the caller supplies a size, the
//! 4-byte `IDX\0` signature when the file starts with it, and empty otherwise.

use std::io::{Cursor, Read};

use log::debug;
use neox_codec::{CompressionType, EncryptionType};
use neox_common::ReadExt;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, KnownLayout};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::detect::IDX_MAGIC;
use crate::{Error, Result};

/// Fixed part of an index record, before the file name.
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout)]
#[repr(C)]
struct RecordHeader {
    file_offset: U32,
    file_length: U32,
    file_original_length: U32,
    compression: U16,
    encryption: U16,
    name_length: U16,
}

/// Smallest possible record: the fixed header with an empty name.
const MIN_RECORD_SIZE: usize = std::mem::size_of::<RecordHeader>();

/// One stored item, as described by the index file.
///
/// Offsets and lengths are not checked against the data file until the
/// entry is read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IndexRecord {
    /// File name within the archive.
    pub filename: String,
    /// Byte offset of the payload in the data file.
    pub file_offset: u32,
    /// Number of payload bytes stored in the data file.
    pub file_length: u32,
    /// Decoded size hint.
    pub file_original_length: u32,
    /// Checksum of the stored bytes (not carried by WPK indexes).
    pub zcrc: u32,
    /// Checksum of the decoded bytes (not carried by WPK indexes).
    pub crc: u32,
    /// Raw structure blob (not carried by WPK indexes).
    #[cfg_attr(feature = "serde", serde(skip))]
    pub file_structure: Option<Vec<u8>>,
    /// Primary compression.
    pub compression: CompressionType,
    /// Encryption.
    pub encryption: EncryptionType,
}

impl IndexRecord {
    /// Check if the entry is compressed.
    #[inline]
    pub fn is_compressed(&self) -> bool {
        self.compression != CompressionType::None
    }

    /// Check if the entry is encrypted.
    #[inline]
    pub fn is_encrypted(&self) -> bool {
        self.encryption != EncryptionType::None
    }
}

/// Parse an index file held in memory.
pub fn parse_index(data: &[u8], info_size: Option<usize>) -> Result<Vec<IndexRecord>> {
    let header_len = match info_size {
        Some(size) => size,
        None if data.starts_with(&IDX_MAGIC) => IDX_MAGIC.len(),
        None => 0,
    };

    if header_len > data.len() {
        return Err(neox_common::Error::Truncated {
            field: "info header",
        }
        .into());
    }

    let mut cursor = Cursor::new(data);
    cursor.set_position(header_len as u64);
    read_records(&mut cursor, data.len() - header_len)
}

/// Read the record count and the records from a stream.
///
/// `available` bounds the up-front allocation so a forged count cannot
/// reserve more records than the stream could hold.
pub fn read_records<R: Read>(reader: &mut R, available: usize) -> Result<Vec<IndexRecord>> {
    let count = reader.read_le_u32("record count")? as usize;
    let mut records = Vec::with_capacity(count.min(available / MIN_RECORD_SIZE));

    for ordinal in 0..count {
        let record = read_record(reader, ordinal)?;
        debug!(
            "Index {}: offset={:#x} length={} orig_length={} compression={} encryption={} name={}",
            ordinal,
            record.file_offset,
            record.file_length,
            record.file_original_length,
            record.compression,
            record.encryption,
            record.filename
        );
        records.push(record);
    }

    Ok(records)
}

fn read_record<R: Read>(reader: &mut R, ordinal: usize) -> Result<IndexRecord> {
    let header: RecordHeader = reader.read_struct("record header")?;

    let compression = CompressionType::try_from(header.compression.get())
        .map_err(|tag| Error::UnsupportedCompression { ordinal, tag })?;
    let encryption = EncryptionType::try_from(header.encryption.get())
        .map_err(|tag| Error::UnsupportedEncryption { ordinal, tag })?;

    let filename = reader.read_utf8(header.name_length.get() as usize, "file name")?;

    Ok(IndexRecord {
        filename,
        file_offset: header.file_offset.get(),
        file_length: header.file_length.get(),
        file_original_length: header.file_original_length.get(),
        compression,
        encryption,
        ..Default::default()
    })
}
