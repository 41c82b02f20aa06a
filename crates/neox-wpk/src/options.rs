//! Read options for opening an archive.

use std::fmt;

/// Options fixed for the lifetime of an archive.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    /// Integer key for XOR-encrypted entries.
    pub decryption_key: Option<u32>,
    /// Raw key material for AES-encrypted entries.
    pub key_material: Option<Vec<u8>>,
    /// Size of the header preceding the record count in the index file.
    pub info_size: Option<usize>,
}

impl ReadOptions {
    /// Options with no keys and automatic header detection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the integer decryption key.
    pub fn with_key(mut self, key: u32) -> Self {
        self.decryption_key = Some(key);
        self
    }

    /// Set the raw key material.
    pub fn with_key_material(mut self, material: impl Into<Vec<u8>>) -> Self {
        self.key_material = Some(material.into());
        self
    }

    /// Override the index info-header size.
    pub fn with_info_size(mut self, size: usize) -> Self {
        self.info_size = Some(size);
        self
    }

    /// Whether a usable (non-zero) decryption key is configured.
    ///
    /// Decode failures are reported as [`DataFlags::ENCRYPTED`] when this is
    /// true and as [`DataFlags::ERROR`] otherwise.
    ///
    /// [`DataFlags::ENCRYPTED`]: neox_codec::DataFlags::ENCRYPTED
    /// [`DataFlags::ERROR`]: neox_codec::DataFlags::ERROR
    #[inline]
    pub fn has_key(&self) -> bool {
        matches!(self.decryption_key, Some(key) if key != 0)
    }
}

impl fmt::Debug for ReadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadOptions")
            .field("decryption_key", &self.decryption_key.map(|_| "<set>"))
            .field("key_material", &self.key_material.as_ref().map(|m| m.len()))
            .field("info_size", &self.info_size)
            .finish()
    }
}
