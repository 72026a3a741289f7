//! Collaborator Interfaces
//!
//! The identity layer does not own interfaces, the transmit queue, the
//! keyring or the directory client. It reaches them through the narrow
//! `OverlayServices` trait so the surrounding daemon can plug in its real
//! implementations and tests can plug in recorders.

use crate::protocol::OverlayFrame;
use crate::Sid;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;

/// Handle to a network interface owned by the interface registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct InterfaceId(u32);

impl InterfaceId {
    /// Create from a raw u32.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the raw u32 value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for InterfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "if{}", self.0)
    }
}

/// Interface state as reported by the interface registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceState {
    /// Interface is up and can carry traffic.
    Up,
    /// Interface exists but is down.
    Down,
    /// Interface has been removed.
    Detached,
}

impl InterfaceState {
    /// Check if the interface can carry traffic.
    pub fn is_up(&self) -> bool {
        matches!(self, InterfaceState::Up)
    }
}

/// Errors reported by collaborators.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("transmit queue full")]
    QueueFull,

    #[error("interface {0} unavailable")]
    InterfaceUnavailable(InterfaceId),

    #[error("probe to {addr} failed: {reason}")]
    ProbeFailed { addr: SocketAddr, reason: String },
}

/// Calls out of the identity layer into the rest of the daemon.
pub trait OverlayServices {
    /// Resolve an interface by configured name.
    fn find_interface(&self, name: &str) -> Option<InterfaceId>;

    /// Current state of an interface.
    fn interface_state(&self, interface: InterfaceId) -> InterfaceState;

    /// Hand a frame to the transmit queue.
    ///
    /// The queue takes ownership of the frame whether or not it is accepted.
    fn enqueue(&mut self, frame: OverlayFrame) -> Result<(), ServiceError>;

    /// Ask the keyring to validate the signature of a subscriber.
    ///
    /// Fire-and-forget: the result arrives later through
    /// `Subscriber::set_sas_valid`.
    fn request_signature(&mut self, sid: &Sid);

    /// Re-register the local node with the directory service.
    fn register_with_directory(&mut self);

    /// Send a reachability probe to a statically configured endpoint.
    fn send_probe(
        &mut self,
        sid: &Sid,
        addr: SocketAddr,
        interface: Option<InterfaceId>,
    ) -> Result<(), ServiceError>;
}

pub mod test_impls {
    //! Recording implementation of `OverlayServices` for tests and the
    //! offline operator binary.

    use super::*;
    use std::collections::HashMap;

    /// Records every call made by the identity layer.
    #[derive(Debug, Default)]
    pub struct MockServices {
        /// Interface name -> (id, state).
        pub interfaces: HashMap<String, (InterfaceId, InterfaceState)>,
        /// Frames handed to the transmit queue.
        pub frames: Vec<OverlayFrame>,
        /// Subscribers a signature was requested for.
        pub signature_requests: Vec<Sid>,
        /// Number of directory registrations.
        pub directory_registrations: usize,
        /// Probes sent.
        pub probes: Vec<(Sid, SocketAddr, Option<InterfaceId>)>,
        /// Reject every enqueue with `QueueFull`.
        pub queue_full: bool,
    }

    impl MockServices {
        /// Create with no interfaces.
        pub fn new() -> Self {
            Self::default()
        }

        /// Register an interface in the given state and return its id.
        pub fn add_interface(&mut self, name: &str, state: InterfaceState) -> InterfaceId {
            let id = InterfaceId::new(self.interfaces.len() as u32 + 1);
            self.interfaces.insert(name.to_string(), (id, state));
            id
        }

        /// Change the state of a registered interface.
        pub fn set_interface_state(&mut self, interface: InterfaceId, state: InterfaceState) {
            for entry in self.interfaces.values_mut() {
                if entry.0 == interface {
                    entry.1 = state;
                }
            }
        }
    }

    impl OverlayServices for MockServices {
        fn find_interface(&self, name: &str) -> Option<InterfaceId> {
            self.interfaces.get(name).map(|(id, _)| *id)
        }

        fn interface_state(&self, interface: InterfaceId) -> InterfaceState {
            self.interfaces
                .values()
                .find(|(id, _)| *id == interface)
                .map(|(_, state)| *state)
                .unwrap_or(InterfaceState::Detached)
        }

        fn enqueue(&mut self, frame: OverlayFrame) -> Result<(), ServiceError> {
            if self.queue_full {
                return Err(ServiceError::QueueFull);
            }
            self.frames.push(frame);
            Ok(())
        }

        fn request_signature(&mut self, sid: &Sid) {
            self.signature_requests.push(*sid);
        }

        fn register_with_directory(&mut self) {
            self.directory_registrations += 1;
        }

        fn send_probe(
            &mut self,
            sid: &Sid,
            addr: SocketAddr,
            interface: Option<InterfaceId>,
        ) -> Result<(), ServiceError> {
            self.probes.push((*sid, addr, interface));
            Ok(())
        }
    }

}
