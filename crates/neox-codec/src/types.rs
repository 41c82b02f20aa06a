//! Enumerations and flag sets shared by the decode pipeline.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Primary compression applied to a stored entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum CompressionType {
    /// Stored as-is.
    #[default]
    None = 0,
    /// zlib stream.
    Zlib = 1,
    /// LZ4 block; the decoded size comes from the index.
    Lz4 = 2,
    /// Zstandard frame.
    Zstd = 3,
}

impl CompressionType {
    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zlib => "zlib",
            Self::Lz4 => "lz4",
            Self::Zstd => "zstd",
        }
    }
}

impl TryFrom<u16> for CompressionType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Zlib),
            2 => Ok(Self::Lz4),
            3 => Ok(Self::Zstd),
            other => Err(other),
        }
    }
}

impl fmt::Display for CompressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encryption applied to a stored entry before compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum EncryptionType {
    /// Plain bytes.
    #[default]
    None = 0,
    /// XOR with the little-endian bytes of the integer key.
    Xor = 1,
    /// AES-128-CBC with raw key material and a zero IV.
    Aes = 2,
}

impl EncryptionType {
    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Xor => "xor",
            Self::Aes => "aes",
        }
    }
}

impl TryFrom<u16> for EncryptionType {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Xor),
            2 => Ok(Self::Aes),
            other => Err(other),
        }
    }
}

impl fmt::Display for EncryptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse content category derived from a file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Category {
    Texture,
    Mesh,
    Bank,
    Text,
    #[default]
    Other,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 5] = [
        Self::Texture,
        Self::Mesh,
        Self::Bank,
        Self::Text,
        Self::Other,
    ];

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Texture => "texture",
            Self::Mesh => "mesh",
            Self::Bank => "bank",
            Self::Text => "text",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

/// Outcome flags recorded while decoding an entry.
///
/// Bits are independent. `ERROR` and `ENCRYPTED` are never both set by the
/// same failure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DataFlags(u8);

impl DataFlags {
    pub const NONE: Self = Self(0);
    /// Content judged non-binary.
    pub const TEXT: Self = Self(1 << 0);
    /// An NXS3 layer was present and stripped.
    pub const NXS3_PACKED: Self = Self(1 << 1);
    /// A rotor layer was present and stripped.
    pub const ROTOR_PACKED: Self = Self(1 << 2);
    /// Decoding failed while a decryption key was configured.
    pub const ENCRYPTED: Self = Self(1 << 3);
    /// Decoding failed unrecoverably, or the ordinal was invalid.
    pub const ERROR: Self = Self(1 << 4);

    const NAMES: [(Self, &'static str); 5] = [
        (Self::TEXT, "TEXT"),
        (Self::NXS3_PACKED, "NXS3_PACKED"),
        (Self::ROTOR_PACKED, "ROTOR_PACKED"),
        (Self::ENCRYPTED, "ENCRYPTED"),
        (Self::ERROR, "ERROR"),
    ];

    /// Raw bit representation.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True when no bit is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when any bit of `other` is set in `self`.
    #[inline]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Set the bits of `other`.
    #[inline]
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }
}

impl BitOr for DataFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for DataFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for DataFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for DataFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataFlags({self})")
    }
}

impl fmt::Display for DataFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }

        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}
