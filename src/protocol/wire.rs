//! Bounds-checked cursor over a received frame.

use super::ProtocolError;

/// Sequential reader over a received payload.
///
/// Every read is bounds-checked; running past the end yields
/// `ProtocolError::MessageTooShort` and leaves the cursor where it was.
#[derive(Clone, Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Check if everything has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Current offset from the start of the buffer.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Read one byte.
    pub fn get_u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.get_bytes(1)?[0])
    }

    /// Read `len` bytes.
    pub fn get_bytes(&mut self, len: usize) -> Result<&'a [u8], ProtocolError> {
        if self.remaining() < len {
            return Err(ProtocolError::MessageTooShort {
                expected: len,
                got: self.remaining(),
            });
        }
        let bytes = &self.buf[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }
}
