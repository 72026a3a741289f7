//! Subscriber Records
//!
//! One record per known SID. Records are created on first reference (by a
//! local application or by parsing any packet that mentions the address)
//! and live for the lifetime of the owning trie.

mod reachability;

pub use reachability::Reachability;

use crate::services::InterfaceId;
use crate::Sid;
use std::fmt;
use std::net::SocketAddr;

/// Handle to a subscriber record inside its owning trie.
///
/// Handles are non-owning: the trie keeps the record, everything else
/// (next hops, decode contexts, the local identity) refers to it by id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriberId(u32);

impl SubscriberId {
    /// Create from a raw arena index.
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    /// Arena index of this record.
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A known subscriber.
#[derive(Clone, Debug)]
pub struct Subscriber {
    /// Full address.
    sid: Sid,
    /// Nibble depth at which this address is unique in the trie.
    abbreviate_len: usize,
    /// Current reachability state.
    reachable: Reachability,
    /// Next hop used while `Indirect`.
    next_hop: Option<SubscriberId>,
    /// Interface this subscriber is directly reachable on.
    interface: Option<InterfaceId>,
    /// Transport endpoint for unicast delivery.
    address: Option<SocketAddr>,
    /// Send the full address on the next outbound packet.
    send_full: bool,
    /// Signature (SAS) of this subscriber has been validated.
    sas_valid: bool,
    /// Already managed by overlay routing.
    routing_known: bool,
}

impl Subscriber {
    /// Create a record for a newly inserted address.
    pub(crate) fn new(sid: Sid, abbreviate_len: usize) -> Self {
        Self {
            sid,
            abbreviate_len,
            reachable: Reachability::None,
            next_hop: None,
            interface: None,
            address: None,
            send_full: false,
            sas_valid: false,
            routing_known: false,
        }
    }

    /// Full address.
    pub fn sid(&self) -> &Sid {
        &self.sid
    }

    /// Nibble depth at which this address became unique.
    pub fn abbreviate_len(&self) -> usize {
        self.abbreviate_len
    }

    pub(crate) fn set_abbreviate_len(&mut self, nibbles: usize) {
        self.abbreviate_len = nibbles;
    }

    /// Stored reachability state (not the effective one).
    pub fn reachable(&self) -> Reachability {
        self.reachable
    }

    /// Replace the stored reachability state without side effects.
    ///
    /// Use `Overlay::set_reachable` to get transition side effects.
    pub(crate) fn set_reachable_raw(&mut self, state: Reachability) {
        self.reachable = state;
    }

    /// Next hop for indirect reachability.
    pub fn next_hop(&self) -> Option<SubscriberId> {
        self.next_hop
    }

    /// Set the next hop for indirect reachability.
    pub fn set_next_hop(&mut self, next_hop: Option<SubscriberId>) {
        self.next_hop = next_hop;
    }

    /// Bound network interface.
    pub fn interface(&self) -> Option<InterfaceId> {
        self.interface
    }

    /// Bind (or unbind) the network interface.
    pub fn set_interface(&mut self, interface: Option<InterfaceId>) {
        self.interface = interface;
    }

    /// Transport endpoint for unicast delivery.
    pub fn address(&self) -> Option<SocketAddr> {
        self.address
    }

    /// Set the transport endpoint.
    pub fn set_address(&mut self, address: Option<SocketAddr>) {
        self.address = address;
    }

    /// Whether the next outbound reference must carry the full address.
    pub fn send_full(&self) -> bool {
        self.send_full
    }

    /// Force (or stop forcing) the full address on the next packet.
    pub fn set_send_full(&mut self, send_full: bool) {
        self.send_full = send_full;
    }

    /// Whether the signature of this subscriber has been validated.
    pub fn sas_valid(&self) -> bool {
        self.sas_valid
    }

    /// Record the outcome of signature validation.
    pub fn set_sas_valid(&mut self, valid: bool) {
        self.sas_valid = valid;
    }

    /// Whether overlay routing already manages this subscriber.
    pub fn routing_known(&self) -> bool {
        self.routing_known
    }

    /// Mark this subscriber as managed by overlay routing.
    pub fn set_routing_known(&mut self, known: bool) {
        self.routing_known = known;
    }
}
