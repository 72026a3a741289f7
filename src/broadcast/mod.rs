//! Broadcast Duplicate Suppression
//!
//! Each broadcast frame carries an 8-byte random broadcast packet
//! identifier (BPI). Nodes remember recently seen BPIs in a fixed-size,
//! direct-mapped table and drop frames whose BPI is already there.
//!
//! The slot is chosen by a cheap rolling hash, not a cryptographic one.
//! Two BPIs hashing to the same slot evict each other, which bounds memory
//! at the cost of an occasional missed duplicate. Failing to suppress a
//! repeat is tolerated; reporting a fresh BPI as a duplicate is not
//! possible because the full id is compared.

use rand::Rng;
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::protocol::{ProtocolError, WireReader};

/// Size of a broadcast packet identifier in bytes.
pub const BROADCAST_ID_SIZE: usize = 8;

/// Default number of slots in the duplicate table.
pub const DEFAULT_BROADCAST_SLOTS: usize = 1024;

/// Largest table the 16-bit rolling hash can address.
pub const MAX_BROADCAST_SLOTS: usize = 1 << 16;

/// Errors related to broadcast filter construction.
#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast slot count must be a power of two, got {0}")]
    SlotsNotPowerOfTwo(usize),

    #[error("broadcast slot count too large: max {max}, got {got}")]
    TooManySlots { max: usize, got: usize },
}

/// Broadcast packet identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct BroadcastId([u8; BROADCAST_ID_SIZE]);

impl BroadcastId {
    /// Create from raw bytes.
    pub fn from_bytes(bytes: [u8; BROADCAST_ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        let mut bytes = [0u8; BROADCAST_ID_SIZE];
        rand::rng().fill(&mut bytes);
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; BROADCAST_ID_SIZE] {
        &self.0
    }

    /// Append the identifier to an outbound frame.
    pub fn encode_into(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.0);
    }

    /// Read an identifier from a received frame.
    pub fn decode(reader: &mut WireReader<'_>) -> Result<Self, ProtocolError> {
        let bytes = reader.get_bytes(BROADCAST_ID_SIZE)?;
        let mut id = [0u8; BROADCAST_ID_SIZE];
        id.copy_from_slice(bytes);
        Ok(Self(id))
    }

    /// Rolling 16-bit hash used to pick a table slot.
    fn hash(&self) -> usize {
        let mut h: usize = 0;
        for &byte in &self.0 {
            h = ((h << 3) & 0xfff8) + ((h >> 13) & 0x7);
            h ^= byte as usize;
        }
        h
    }
}

impl fmt::Debug for BroadcastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BroadcastId({})", hex::encode(self.0))
    }
}

impl fmt::Display for BroadcastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Direct-mapped table of recently seen broadcast identifiers.
#[derive(Clone, Debug)]
pub struct BroadcastFilter {
    slots: Vec<Option<BroadcastId>>,
    mask: usize,
}

impl BroadcastFilter {
    /// Create a filter with `slots` entries (a power of two).
    pub fn new(slots: usize) -> Result<Self, BroadcastError> {
        if !slots.is_power_of_two() {
            return Err(BroadcastError::SlotsNotPowerOfTwo(slots));
        }
        if slots > MAX_BROADCAST_SLOTS {
            return Err(BroadcastError::TooManySlots {
                max: MAX_BROADCAST_SLOTS,
                got: slots,
            });
        }
        Ok(Self {
            slots: vec![None; slots],
            mask: slots - 1,
        })
    }

    /// Number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Check whether `id` was seen recently, recording it if not.
    ///
    /// Returns true for a duplicate (drop the frame). A duplicate leaves
    /// the table unchanged; a new id evicts whatever shared its slot.
    pub fn check_and_record(&mut self, id: &BroadcastId) -> bool {
        let index = id.hash() & self.mask;
        let slot = &mut self.slots[index];

        if slot.as_ref() == Some(id) {
            debug!(bpi = %id, "BPI is a duplicate");
            return true;
        }

        debug!(bpi = %id, "BPI is new");
        *slot = Some(*id);
        false
    }

    /// Forget every recorded identifier.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }
}

impl Default for BroadcastFilter {
    fn default() -> Self {
        Self {
            slots: vec![None; DEFAULT_BROADCAST_SLOTS],
            mask: DEFAULT_BROADCAST_SLOTS - 1,
        }
    }
}
