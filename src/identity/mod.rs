//! Overlay Address Identity
//!
//! Every node in the overlay is named by a 256-bit subscriber id (SID)
//! derived from its public key. The first byte values `0x00..=0x0f` are
//! reserved for protocol control codes and never start a genuine SID.

mod sid;

use thiserror::Error;

pub use sid::Sid;
pub(crate) use sid::nibble_at;

/// Size of a full subscriber id in bytes.
pub const SID_SIZE: usize = 32;

/// Number of nibbles in a full subscriber id.
pub const SID_NIBBLES: usize = SID_SIZE * 2;

/// Highest first-byte value reserved for control codes.
pub const RESERVED_PREFIX_MAX: u8 = 0x0f;

/// Errors that can occur in identity operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("invalid sid length: expected 32, got {0}")]
    InvalidSidLength(usize),

    #[error("invalid sid prefix: 0x{0:02x} is reserved for control codes")]
    ReservedPrefix(u8),

    #[error("invalid hex encoding: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Encode bytes as lowercase hex string.
pub(crate) fn hex_encode(bytes: &[u8]) -> String {
    hex::encode(bytes)
}

#[cfg(test)]
mod tests;
