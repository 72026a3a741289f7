//! Frames handed to the transmit queue.

use std::fmt;
use std::net::SocketAddr;

use crate::broadcast::BroadcastId;
use crate::services::InterfaceId;
use crate::Sid;

/// Overlay frame types produced by the identity layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameType {
    /// Abbreviation clarification request or response.
    PleaseExplain,
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameType::PleaseExplain => write!(f, "please-explain"),
        }
    }
}

/// Transmit queue a frame is placed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueuePriority {
    /// Mesh control traffic, sent ahead of user data.
    MeshManagement,
    /// Ordinary user data.
    Ordinary,
}

/// An outbound frame.
#[derive(Clone, Debug)]
pub struct OverlayFrame {
    /// Frame type.
    pub frame_type: FrameType,
    /// Originating subscriber.
    pub source: Sid,
    /// Destination subscriber; `None` for a pure broadcast.
    pub destination: Option<Sid>,
    /// Remaining hop count.
    pub ttl: u8,
    /// Broadcast identifier when the frame is flooded.
    pub broadcast_id: Option<BroadcastId>,
    /// Queue the frame is placed on.
    pub queue: QueuePriority,
    /// Next hop already resolved by the sender, bypassing routing.
    pub next_hop: Option<Sid>,
    /// Interface to send on when the next hop is resolved.
    pub interface: Option<InterfaceId>,
    /// Link address the triggering packet arrived from.
    pub recv_addr: Option<SocketAddr>,
    /// Frame payload.
    pub payload: Vec<u8>,
}

impl OverlayFrame {
    /// Create an unrouted frame of the given type.
    pub fn new(frame_type: FrameType, source: Sid, payload: Vec<u8>) -> Self {
        Self {
            frame_type,
            source,
            destination: None,
            ttl: 0,
            broadcast_id: None,
            queue: QueuePriority::Ordinary,
            next_hop: None,
            interface: None,
            recv_addr: None,
            payload,
        }
    }

    /// Check if the frame is flooded rather than routed.
    pub fn is_broadcast(&self) -> bool {
        self.broadcast_id.is_some()
    }
}
