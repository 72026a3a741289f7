//! Overlay Address Context
//!
//! Top-level structure holding all identity-layer state of one node: the
//! subscriber trie, the broadcast duplicate table, configuration and the
//! collaborator services. Every operation goes through an `Overlay`, so
//! independent instances can coexist in one process.

mod codec;
mod explain;
mod reachability;
#[cfg(test)]
mod tests;

use crate::broadcast::{BroadcastError, BroadcastFilter, BroadcastId};
use crate::config::Config;
use crate::protocol::ProtocolError;
use crate::services::{OverlayServices, ServiceError};
use crate::subscriber::{Reachability, Subscriber, SubscriberId};
use crate::trie::{SubscriberTrie, TrieError};
use crate::{IdentityError, Sid};
use thiserror::Error;
use tracing::debug;

pub use codec::DecodeContext;
pub use reachability::ProbeOutcome;

/// Errors related to overlay operations.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("no local identity configured")]
    NoLocalIdentity,

    #[error("unknown subscriber: {0}")]
    UnknownSubscriber(SubscriberId),

    #[error("subscriber {0} is already reachable")]
    AlreadyReachable(Sid),

    #[error("subscriber {0} is already known for overlay routing")]
    RoutingKnown(Sid),

    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    #[error("trie error: {0}")]
    Trie(#[from] TrieError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Identity layer of one overlay node.
pub struct Overlay<S: OverlayServices> {
    /// Every known subscriber.
    trie: SubscriberTrie,
    /// Recently seen broadcast identifiers.
    broadcasts: BroadcastFilter,
    /// Loaded configuration.
    config: Config,
    /// Interface registry, transmit queue, keyring and directory client.
    services: S,
    /// Our own subscriber.
    local: Option<SubscriberId>,
    /// Subscriber acting as directory service.
    directory: Option<SubscriberId>,
}

impl<S: OverlayServices> Overlay<S> {
    /// Create an empty overlay from configuration.
    pub fn new(config: Config, services: S) -> Result<Self, OverlayError> {
        let broadcasts = BroadcastFilter::new(config.overlay.broadcast_slots())?;
        let trie = match config.overlay.max_subscribers {
            Some(max) => SubscriberTrie::with_max_subscribers(max),
            None => SubscriberTrie::new(),
        };

        Ok(Self {
            trie,
            broadcasts,
            config,
            services,
            local: None,
            directory: None,
        })
    }

    // === Accessors ===

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the subscriber trie.
    pub fn trie(&self) -> &SubscriberTrie {
        &self.trie
    }

    /// Get the collaborator services.
    pub fn services(&self) -> &S {
        &self.services
    }

    /// Get mutable collaborator services.
    pub fn services_mut(&mut self) -> &mut S {
        &mut self.services
    }

    /// Get a subscriber record.
    pub fn subscriber(&self, id: SubscriberId) -> Result<&Subscriber, OverlayError> {
        self.trie.get(id).ok_or(OverlayError::UnknownSubscriber(id))
    }

    /// Get a mutable subscriber record.
    pub fn subscriber_mut(&mut self, id: SubscriberId) -> Result<&mut Subscriber, OverlayError> {
        self.trie
            .get_mut(id)
            .ok_or(OverlayError::UnknownSubscriber(id))
    }

    /// Find or create the subscriber for a full address.
    pub fn find_or_create(&mut self, sid: &Sid) -> Result<SubscriberId, OverlayError> {
        Ok(self.trie.find_or_create(sid)?)
    }

    // === Identity ===

    /// Register our own address and mark it as self.
    pub fn set_local_identity(&mut self, sid: &Sid) -> Result<SubscriberId, OverlayError> {
        let id = self.trie.find_or_create(sid)?;
        self.subscriber_mut(id)?.set_reachable_raw(Reachability::SelfNode);
        self.local = Some(id);
        debug!(sid = %sid, "Local identity set");
        Ok(id)
    }

    /// Our own subscriber, if set.
    pub fn local(&self) -> Option<SubscriberId> {
        self.local
    }

    /// Mark a subscriber as the directory service.
    ///
    /// Reachability changes of the directory service trigger a
    /// re-registration.
    pub fn set_directory_service(&mut self, id: Option<SubscriberId>) -> Result<(), OverlayError> {
        if let Some(id) = id {
            self.subscriber(id)?;
        }
        self.directory = id;
        Ok(())
    }

    /// Current directory service subscriber.
    pub fn directory_service(&self) -> Option<SubscriberId> {
        self.directory
    }

    // === Broadcast ===

    /// Generate a fresh broadcast identifier for an outbound flood.
    pub fn generate_broadcast_id(&self) -> BroadcastId {
        BroadcastId::generate()
    }

    /// Check a received broadcast identifier, recording it if new.
    ///
    /// Returns true if the frame should be dropped.
    pub fn is_duplicate_broadcast(&mut self, id: &BroadcastId) -> bool {
        self.broadcasts.check_and_record(id)
    }
}

impl<S: OverlayServices + std::fmt::Debug> std::fmt::Debug for Overlay<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Overlay")
            .field("subscribers", &self.trie.len())
            .field("local", &self.local)
            .field("directory", &self.directory)
            .field("services", &self.services)
            .finish()
    }
}
