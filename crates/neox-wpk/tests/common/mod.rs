//! Shared fixtures: synthetic archive pairs and a call-counting codec.

#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use neox_codec::layers::{rotor_mask, NXS3_MAGIC, ROTOR_MAGIC};
use neox_wpk::{Category, Codec, CompressionType, DataFlags, EncryptionType, StandardCodec};

static INIT: Once = Once::new();

/// Route library logs to the test harness.
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

struct Item {
    name: String,
    stored: Vec<u8>,
    original_length: u32,
    compression: u16,
    encryption: u16,
}

/// Builds an index/data pair on disk.
#[derive(Default)]
pub struct ArchiveBuilder {
    items: Vec<Item>,
    signature: bool,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefix the index with the `IDX\0` signature.
    pub fn with_signature(mut self) -> Self {
        self.signature = true;
        self
    }

    /// An uncompressed, unencrypted entry.
    pub fn stored(self, name: &str, data: &[u8]) -> Self {
        self.raw(name, data.to_vec(), data.len() as u32, 0, 0)
    }

    /// An entry with explicit stored bytes and tags.
    pub fn raw(
        mut self,
        name: &str,
        stored: Vec<u8>,
        original_length: u32,
        compression: u16,
        encryption: u16,
    ) -> Self {
        self.items.push(Item {
            name: name.to_string(),
            stored,
            original_length,
            compression,
            encryption,
        });
        self
    }

    /// Write `<stem>.idx` and `<stem>.wpk` into `dir`.
    pub fn write(&self, dir: &Path, stem: &str) -> (PathBuf, PathBuf) {
        let mut data = b"WPK\0".to_vec();
        let mut index = Vec::new();
        if self.signature {
            index.extend_from_slice(b"IDX\0");
        }
        index.extend_from_slice(&(self.items.len() as u32).to_le_bytes());

        for item in &self.items {
            let offset = data.len() as u32;
            data.extend_from_slice(&item.stored);

            index.extend_from_slice(&offset.to_le_bytes());
            index.extend_from_slice(&(item.stored.len() as u32).to_le_bytes());
            index.extend_from_slice(&item.original_length.to_le_bytes());
            index.extend_from_slice(&item.compression.to_le_bytes());
            index.extend_from_slice(&item.encryption.to_le_bytes());
            index.extend_from_slice(&(item.name.len() as u16).to_le_bytes());
            index.extend_from_slice(item.name.as_bytes());
        }

        let index_path = dir.join(format!("{stem}.idx"));
        let data_path = dir.join(format!("{stem}.wpk"));
        fs::write(&index_path, index).unwrap();
        fs::write(&data_path, data).unwrap();
        (index_path, data_path)
    }
}

/// Wrap data in a rotor layer.
pub fn pack_rotor(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    let mut body = encoder.finish().unwrap();
    rotor_mask(&mut body);

    let mut out = ROTOR_MAGIC.to_vec();
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

/// Wrap data in an NXS3 layer.
pub fn pack_nxs3(data: &[u8]) -> Vec<u8> {
    let mut out = NXS3_MAGIC.to_vec();
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    out.extend_from_slice(&lz4_flex::block::compress(data));
    out
}

/// Standard codec that counts every primitive call.
#[derive(Default)]
pub struct CountingCodec {
    pub decrypt: AtomicUsize,
    pub decompress: AtomicUsize,
    pub rotor: AtomicUsize,
    pub nxs3: AtomicUsize,
    pub classify: AtomicUsize,
    /// Make every decompression fail.
    pub fail_decompress: bool,
}

impl CountingCodec {
    pub fn failing() -> Self {
        Self {
            fail_decompress: true,
            ..Default::default()
        }
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

impl Codec for CountingCodec {
    fn decrypt(
        &self,
        data: &[u8],
        kind: EncryptionType,
        key: Option<u32>,
        material: Option<&[u8]>,
    ) -> neox_codec::Result<Vec<u8>> {
        self.decrypt.fetch_add(1, Ordering::SeqCst);
        StandardCodec.decrypt(data, kind, key, material)
    }

    fn decompress(
        &self,
        data: &[u8],
        kind: CompressionType,
        original_length: u32,
    ) -> neox_codec::Result<Vec<u8>> {
        self.decompress.fetch_add(1, Ordering::SeqCst);
        if self.fail_decompress {
            return Err(neox_codec::Error::Decompression {
                kind,
                reason: "forced failure".to_string(),
            });
        }
        StandardCodec.decompress(data, kind, original_length)
    }

    fn is_rotor(&self, data: &[u8]) -> bool {
        self.rotor.fetch_add(1, Ordering::SeqCst);
        StandardCodec.is_rotor(data)
    }

    fn is_nxs3(&self, data: &[u8]) -> bool {
        self.nxs3.fetch_add(1, Ordering::SeqCst);
        StandardCodec.is_nxs3(data)
    }

    fn is_text(&self, data: &[u8]) -> bool {
        self.classify.fetch_add(1, Ordering::SeqCst);
        StandardCodec.is_text(data)
    }

    fn extension(&self, data: &[u8], flags: DataFlags) -> String {
        StandardCodec.extension(data, flags)
    }

    fn category(&self, extension: &str) -> Category {
        StandardCodec.category(extension)
    }
}
