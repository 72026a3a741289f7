//! meshaddr: overlay address identity
//!
//! Maps 256-bit subscriber ids to the short link-local abbreviations used on
//! the wire, resolves received abbreviations back to subscribers, keeps
//! per-subscriber reachability and suppresses duplicate broadcasts.

pub mod broadcast;
pub mod config;
pub mod identity;
pub mod overlay;
pub mod protocol;
pub mod services;
pub mod subscriber;
pub mod trie;

// Re-export identity types
pub use identity::{IdentityError, SID_SIZE, Sid};

// Re-export config types
pub use config::{Config, ConfigError, HostConfig, OverlayConfig};

// Re-export subscriber types
pub use subscriber::{Reachability, Subscriber, SubscriberId};

// Re-export trie types
pub use trie::{Lookup, SubscriberTrie, TrieError};

// Re-export broadcast types
pub use broadcast::{BroadcastError, BroadcastFilter, BroadcastId};

// Re-export protocol types
pub use protocol::{
    ExplainPayload, ExplainRecord, FrameType, OverlayFrame, ProtocolError, QueuePriority,
    WireReader,
};

// Re-export service types
pub use services::{InterfaceId, InterfaceState, OverlayServices, ServiceError};

// Re-export overlay types
pub use overlay::{DecodeContext, Overlay, OverlayError, ProbeOutcome};
