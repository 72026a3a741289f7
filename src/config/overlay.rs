//! Identity layer tuning (`overlay.*`).

use serde::{Deserialize, Serialize};

use crate::broadcast::DEFAULT_BROADCAST_SLOTS;
use crate::protocol::{DEFAULT_EXPLAIN_MTU, PLEASE_EXPLAIN_UNICAST_TTL};

/// Identity layer configuration (`overlay.*`).
///
/// Every field is optional so that files higher in the search order only
/// override what they set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverlayConfig {
    /// Slots in the broadcast duplicate table, a power of two
    /// (`overlay.broadcast_slots`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broadcast_slots: Option<usize>,

    /// Maximum please-explain payload in bytes (`overlay.explain_mtu`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explain_mtu: Option<usize>,

    /// Hop limit for please-explain sent to a reachable node
    /// (`overlay.unicast_ttl`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unicast_ttl: Option<u8>,

    /// Refuse new subscribers beyond this count (`overlay.max_subscribers`).
    /// Unlimited when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_subscribers: Option<usize>,
}

impl OverlayConfig {
    /// Broadcast table size (default: 1024).
    pub fn broadcast_slots(&self) -> usize {
        self.broadcast_slots.unwrap_or(DEFAULT_BROADCAST_SLOTS)
    }

    /// Please-explain payload limit (default: 1024).
    pub fn explain_mtu(&self) -> usize {
        self.explain_mtu.unwrap_or(DEFAULT_EXPLAIN_MTU)
    }

    /// Unicast please-explain hop limit (default: 64).
    pub fn unicast_ttl(&self) -> u8 {
        self.unicast_ttl.unwrap_or(PLEASE_EXPLAIN_UNICAST_TTL)
    }

    /// Merge another section into this one; set fields in `other` win.
    pub fn merge(&mut self, other: OverlayConfig) {
        if other.broadcast_slots.is_some() {
            self.broadcast_slots = other.broadcast_slots;
        }
        if other.explain_mtu.is_some() {
            self.explain_mtu = other.explain_mtu;
        }
        if other.unicast_ttl.is_some() {
            self.unicast_ttl = other.unicast_ttl;
        }
        if other.max_subscribers.is_some() {
            self.max_subscribers = other.max_subscribers;
        }
    }
}
