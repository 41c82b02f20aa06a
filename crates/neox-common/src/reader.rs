//! Binary field readers.
//!
//! [`BinaryReader`] is a cursor over an in-memory byte slice. [`ReadExt`]
//! reads the same fixed-width fields from any [`Read`] stream at its current
//! position, naming the field when the stream ends early.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use zerocopy::FromBytes;

use crate::{Error, Result};

/// A cursor over a packed header held in memory.
///
/// # Example
///
/// ```
/// use neox_common::BinaryReader;
///
/// let data = [b'N', b'X', 0x05, 0x00, 0x00, 0x00, 0xAA];
/// let mut reader = BinaryReader::new(&data);
///
/// reader.expect_magic(b"NX").unwrap();
/// assert_eq!(reader.read_u32().unwrap(), 5);
/// assert_eq!(reader.remaining_bytes(), &[0xAA]);
/// ```
#[derive(Debug, Clone)]
pub struct BinaryReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryReader<'a> {
    /// Create a new reader from a byte slice.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a little-endian u32.
    #[inline]
    pub fn read_u32(&mut self) -> Result<u32> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Expect specific magic bytes.
    pub fn expect_magic(&mut self, expected: &[u8]) -> Result<()> {
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(Error::InvalidMagic {
                expected: expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        Ok(())
    }
}

/// Fixed-width field reads from a stream.
///
/// Every method consumes exactly the bytes of the field from the current
/// cursor. A stream that ends inside a field yields [`Error::Truncated`]
/// carrying the field name.
pub trait ReadExt: Read {
    /// Read a little-endian u32.
    fn read_le_u32(&mut self, field: &'static str) -> Result<u32> {
        self.read_u32::<LittleEndian>().map_err(|e| field_error(e, field))
    }

    /// Read exactly `len` bytes.
    fn read_vec(&mut self, len: usize, field: &'static str) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.read_exact(&mut bytes).map_err(|e| field_error(e, field))?;
        Ok(bytes)
    }

    /// Read exactly `len` bytes and decode them as UTF-8.
    fn read_utf8(&mut self, len: usize, field: &'static str) -> Result<String> {
        let bytes = self.read_vec(len, field)?;
        String::from_utf8(bytes).map_err(|e| Error::Utf8(e.utf8_error()))
    }

    /// Read a structure from the stream.
    fn read_struct<T: FromBytes>(&mut self, field: &'static str) -> Result<T> {
        let size = std::mem::size_of::<T>();
        let bytes = self.read_vec(size, field)?;
        T::read_from_bytes(&bytes).map_err(|_| Error::UnexpectedEof {
            needed: size,
            available: bytes.len(),
        })
    }
}

impl<R: Read + ?Sized> ReadExt for R {}

fn field_error(err: io::Error, field: &'static str) -> Error {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        Error::Truncated { field }
    } else {
        Error::Io(err)
    }
}
