//! Protocol error types.

use thiserror::Error;

/// Errors related to address and please-explain wire handling.
///
/// All of these are fatal for the field being parsed; the enclosing frame
/// is dropped by the caller.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("message too short: expected at least {expected}, got {got}")]
    MessageTooShort { expected: usize, got: usize },

    #[error("message too long: max {max}, got {got}")]
    MessageTooLong { max: usize, got: usize },

    #[error("invalid abbreviation length: {0}")]
    InvalidAbbreviationLength(u8),

    #[error("malformed message: {0}")]
    Malformed(String),
}
