//! Entry decryption.
//!
//! Two schemes are in use: a repeating XOR keystream built from the integer
//! key, and AES-128-CBC with caller-supplied key material and a zero IV.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, KeyIvInit};

use crate::{EncryptionType, Error, Result};

type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// AES block size in bytes.
pub const AES_BLOCK_SIZE: usize = 16;

/// The initialization vector (all zeros).
const AES_IV: [u8; AES_BLOCK_SIZE] = [0u8; AES_BLOCK_SIZE];

/// Decrypt an entry payload according to its encryption kind.
pub fn decrypt(
    data: &[u8],
    kind: EncryptionType,
    key: Option<u32>,
    material: Option<&[u8]>,
) -> Result<Vec<u8>> {
    match kind {
        EncryptionType::None => Ok(data.to_vec()),
        EncryptionType::Xor => {
            let key = key.ok_or(Error::MissingKey(kind))?;
            let mut buffer = data.to_vec();
            xor_in_place(&mut buffer, key);
            Ok(buffer)
        }
        EncryptionType::Aes => {
            let material = material.ok_or(Error::MissingKey(kind))?;
            let mut buffer = data.to_vec();
            aes_decrypt_in_place(&mut buffer, material)?;
            Ok(buffer)
        }
    }
}

/// XOR data in place with the little-endian bytes of `key`, repeated.
///
/// The transform is its own inverse.
pub fn xor_in_place(data: &mut [u8], key: u32) {
    let pad = key.to_le_bytes();
    for (byte, k) in data.iter_mut().zip(pad.iter().cycle()) {
        *byte ^= k;
    }
}

/// Decrypt AES-128-CBC data in place.
///
/// The data length must be a multiple of the AES block size (16 bytes) and the
/// key material must be exactly 16 bytes. No padding is removed.
pub fn aes_decrypt_in_place(data: &mut [u8], material: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Ok(());
    }

    if material.len() != AES_BLOCK_SIZE {
        return Err(Error::Decryption(format!(
            "AES key must be {AES_BLOCK_SIZE} bytes, got {}",
            material.len()
        )));
    }

    if data.len() % AES_BLOCK_SIZE != 0 {
        return Err(Error::Decryption(format!(
            "data length {} is not a multiple of {AES_BLOCK_SIZE} bytes",
            data.len()
        )));
    }

    let key = GenericArray::from_slice(material);
    let iv = GenericArray::from_slice(&AES_IV);
    let decryptor = Aes128CbcDec::new(key, iv);

    decryptor
        .decrypt_padded_mut::<aes::cipher::block_padding::NoPadding>(data)
        .map_err(|_| Error::Decryption("AES decryption failed".to_string()))?;

    Ok(())
}
