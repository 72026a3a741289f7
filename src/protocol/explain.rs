//! Please-explain payload encoding.
//!
//! ```text
//! [len:1][bytes:len] [len:1][bytes:len] ...
//! ```
//!
//! A record whose length equals the full SID size introduces a subscriber;
//! a shorter record asks the receiver to expand that abbreviation.

use super::{ProtocolError, WireReader};
use crate::{Sid, SID_SIZE};

/// Default maximum please-explain payload size in bytes.
pub const DEFAULT_EXPLAIN_MTU: usize = 1024;

/// Outbound please-explain payload with a hard size limit.
#[derive(Clone, Debug)]
pub struct ExplainPayload {
    buf: Vec<u8>,
    max_size: usize,
}

impl ExplainPayload {
    /// Create an empty payload bounded to `max_size` bytes.
    pub fn new(max_size: usize) -> Self {
        Self {
            buf: Vec::new(),
            max_size,
        }
    }

    /// Append one record.
    ///
    /// A record that would overflow the size limit is not written at all.
    pub fn push(&mut self, bytes: &[u8]) -> Result<(), ProtocolError> {
        if bytes.is_empty() || bytes.len() > SID_SIZE {
            let len = bytes.len().min(u8::MAX as usize) as u8;
            return Err(ProtocolError::InvalidAbbreviationLength(len));
        }
        let needed = self.buf.len() + 1 + bytes.len();
        if needed > self.max_size {
            return Err(ProtocolError::MessageTooLong {
                max: self.max_size,
                got: needed,
            });
        }
        self.buf.push(bytes.len() as u8);
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append a full-address introduction record.
    pub fn push_sid(&mut self, sid: &Sid) -> Result<(), ProtocolError> {
        self.push(sid.as_bytes())
    }

    /// Encoded payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume into the encoded payload.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if no record has been written.
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Size limit in bytes.
    pub fn max_size(&self) -> usize {
        self.max_size
    }
}

/// One decoded please-explain record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExplainRecord<'a> {
    /// Full address, sent unsolicited or in answer to a request.
    Introduction(Sid),
    /// Abbreviation the sender wants expanded.
    Request(&'a [u8]),
}

/// Decode and validate every record of a please-explain payload.
pub fn parse_explain_records(payload: &[u8]) -> Result<Vec<ExplainRecord<'_>>, ProtocolError> {
    let mut reader = WireReader::new(payload);
    let mut records = Vec::new();

    while !reader.is_empty() {
        let len = reader.get_u8()?;
        if len == 0 || len as usize > SID_SIZE {
            return Err(ProtocolError::InvalidAbbreviationLength(len));
        }
        let bytes = reader.get_bytes(len as usize)?;

        if bytes.len() == SID_SIZE {
            let sid = Sid::from_slice(bytes)
                .map_err(|e| ProtocolError::Malformed(format!("bad introduction: {e}")))?;
            records.push(ExplainRecord::Introduction(sid));
        } else {
            records.push(ExplainRecord::Request(bytes));
        }
    }

    Ok(records)
}
