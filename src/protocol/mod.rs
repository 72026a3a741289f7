//! Address Wire Protocol
//!
//! Wire contract owned by the identity layer:
//!
//! ## Address reference
//!
//! ```text
//! [code:1]                 code == 0xff: the packet's sender
//!                          code == 0xfe: same as the previous address
//! [len:1][prefix:len]      len in 1..=32: leading bytes of the SID
//! ```
//!
//! ## Please-explain payload
//!
//! A sequence of `[len:1][bytes:len]` records, see `explain`.
//!
//! ## Broadcast identifier
//!
//! Fixed 8 opaque bytes, once per broadcast frame.

mod error;
mod explain;
mod frame;
mod wire;

pub use error::ProtocolError;
pub use explain::{parse_explain_records, ExplainPayload, ExplainRecord, DEFAULT_EXPLAIN_MTU};
pub use frame::{FrameType, OverlayFrame, QueuePriority};
pub use wire::WireReader;

/// Address code: the packet's declared sender.
pub const OA_CODE_SELF: u8 = 0xff;

/// Address code: same address as the previous one in this packet.
pub const OA_CODE_PREVIOUS: u8 = 0xfe;

/// Hop limit for a please-explain routed to a reachable destination.
pub const PLEASE_EXPLAIN_UNICAST_TTL: u8 = 64;

/// Hop limit for a flooded please-explain; abbreviations are link-local.
pub const PLEASE_EXPLAIN_BROADCAST_TTL: u8 = 1;
