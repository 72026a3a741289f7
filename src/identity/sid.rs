//! 32-byte subscriber id.

use rand::Rng;
use std::fmt;
use std::str::FromStr;

use super::{hex_encode, IdentityError, RESERVED_PREFIX_MAX, SID_SIZE};

/// 32-byte subscriber id (SID).
///
/// Ordering is lexicographic over the bytes, which is also the order the
/// subscriber trie enumerates addresses in.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sid([u8; SID_SIZE]);

impl Sid {
    /// Create a Sid from a 32-byte array.
    ///
    /// Fails if the first byte falls in the reserved control range.
    pub fn from_bytes(bytes: [u8; SID_SIZE]) -> Result<Self, IdentityError> {
        if bytes[0] <= RESERVED_PREFIX_MAX {
            return Err(IdentityError::ReservedPrefix(bytes[0]));
        }
        Ok(Self(bytes))
    }

    /// Create a Sid from a slice.
    pub fn from_slice(slice: &[u8]) -> Result<Self, IdentityError> {
        if slice.len() != SID_SIZE {
            return Err(IdentityError::InvalidSidLength(slice.len()));
        }
        let mut bytes = [0u8; SID_SIZE];
        bytes.copy_from_slice(slice);
        Self::from_bytes(bytes)
    }

    /// Parse a Sid from 64 hex digits.
    pub fn from_hex(s: &str) -> Result<Self, IdentityError> {
        let bytes = hex::decode(s.trim())?;
        Self::from_slice(&bytes)
    }

    /// Generate a random, valid Sid.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SID_SIZE];
        rand::rng().fill(&mut bytes);
        if bytes[0] <= RESERVED_PREFIX_MAX {
            bytes[0] |= 0x10;
        }
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; SID_SIZE] {
        &self.0
    }

    /// Return the leading `len` bytes sent as an abbreviation.
    ///
    /// `len` is clamped to the full address size.
    pub fn abbreviation(&self, len: usize) -> &[u8] {
        &self.0[..len.min(SID_SIZE)]
    }

    /// The 4-bit digit at nibble position `pos`, high nibble first.
    pub fn nibble(&self, pos: usize) -> usize {
        nibble_at(&self.0, pos)
    }

    /// Check whether this Sid starts with `prefix`.
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.0.starts_with(prefix)
    }
}

/// The 4-bit digit at nibble position `pos` of an arbitrary byte string.
pub(crate) fn nibble_at(bytes: &[u8], pos: usize) -> usize {
    let byte = bytes[pos >> 1];
    if pos & 1 == 0 {
        (byte >> 4) as usize
    } else {
        (byte & 0x0f) as usize
    }
}

impl FromStr for Sid {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sid({})", hex_encode(&self.0[..8]))
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex_encode(&self.0))
    }
}

impl AsRef<[u8]> for Sid {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
