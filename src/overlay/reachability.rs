//! Subscriber reachability transitions and queries.

use std::net::SocketAddr;

use super::{Overlay, OverlayError};
use crate::services::{InterfaceId, OverlayServices};
use crate::subscriber::{Reachability, SubscriberId};
use tracing::{debug, warn};

/// Longest next-hop chain followed when resolving indirect reachability.
const MAX_NEXT_HOP_DEPTH: usize = 8;

/// Result of `Overlay::load_subscriber_address`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The subscriber is already reachable; nothing sent.
    AlreadyReachable,
    /// No static host entry for the subscriber.
    NotConfigured,
    /// A probe was handed to the transport.
    ProbeSent,
}

impl<S: OverlayServices> Overlay<S> {
    /// Change the stored reachability of a subscriber.
    ///
    /// Does nothing if the state is unchanged. Entering a reachable state
    /// without a validated signature asks the keyring for one; any change
    /// of the directory service re-registers with it.
    pub fn set_reachable(
        &mut self,
        id: SubscriberId,
        state: Reachability,
    ) -> Result<(), OverlayError> {
        let sub = self.subscriber_mut(id)?;
        if sub.reachable() == state {
            return Ok(());
        }
        sub.set_reachable_raw(state);
        let sid = *sub.sid();
        let sas_valid = sub.sas_valid();
        let next_hop = sub.next_hop();

        match state {
            Reachability::SelfNode => {}
            Reachability::Indirect => {
                let via = next_hop.and_then(|hop| self.trie.get(hop));
                debug!(
                    sid = %sid,
                    via = %via.map(|s| s.sid().to_string()).unwrap_or_else(|| "none".into()),
                    via_state = %via.map(|s| s.reachable()).unwrap_or_default(),
                    "Reachable indirectly"
                );
            }
            _ => debug!(sid = %sid, state = %state, "Reachability changed"),
        }

        if !sas_valid && state.is_reachable() {
            self.services.request_signature(&sid);
        }

        if self.directory == Some(id) {
            debug!(sid = %sid, "Directory service reachability changed, registering");
            self.services.register_with_directory();
        }

        Ok(())
    }

    /// Reachability of a subscriber as it can actually be used right now.
    ///
    /// An indirect route counts only if its next hop is confirmed direct; a
    /// direct state counts only while its interface is up. Unknown ids are
    /// not reachable.
    pub fn effective_reachability(&self, id: SubscriberId) -> Reachability {
        self.resolve_reachability(id, 0)
    }

    fn resolve_reachability(&self, id: SubscriberId, depth: usize) -> Reachability {
        let Some(sub) = self.trie.get(id) else {
            return Reachability::None;
        };
        let mut state = sub.reachable();

        if state == Reachability::Indirect {
            let hop = sub
                .next_hop()
                .filter(|&hop| hop != id)
                .and_then(|hop| self.trie.get(hop).map(|rec| (hop, rec)));

            state = match hop {
                None => Reachability::None,
                Some((_, rec)) if !rec.reachable().is_direct() => Reachability::None,
                Some(_) if depth >= MAX_NEXT_HOP_DEPTH => {
                    warn!(sid = %sub.sid(), "Next hop chain too long");
                    Reachability::None
                }
                Some((hop, _)) => {
                    let resolved = self.resolve_reachability(hop, depth + 1);
                    if resolved.is_assumed() || !resolved.is_direct() {
                        Reachability::None
                    } else {
                        Reachability::Indirect
                    }
                }
            };
        }

        if state.is_direct() {
            let up = sub
                .interface()
                .is_some_and(|iface| self.services.interface_state(iface).is_up());
            if !up {
                state = Reachability::None;
            }
        }

        state
    }

    /// Mark a subscriber reachable by unicast after a reply from `addr`
    /// arrived on `interface`.
    ///
    /// Refuses subscribers that are already reachable or already managed by
    /// overlay routing.
    pub fn reachable_unicast(
        &mut self,
        id: SubscriberId,
        interface: InterfaceId,
        addr: SocketAddr,
    ) -> Result<(), OverlayError> {
        let sub = self.subscriber_mut(id)?;
        if sub.reachable().is_reachable() {
            return Err(OverlayError::AlreadyReachable(*sub.sid()));
        }
        if sub.routing_known() {
            return Err(OverlayError::RoutingKnown(*sub.sid()));
        }

        sub.set_interface(Some(interface));
        sub.set_address(Some(addr));
        self.set_reachable(id, Reachability::UNICAST)
    }

    /// Probe a subscriber at its statically configured unicast address.
    ///
    /// Does nothing if the subscriber is already reachable or has no host
    /// entry. A host entry naming an unknown interface is an error.
    pub fn load_subscriber_address(
        &mut self,
        id: SubscriberId,
    ) -> Result<ProbeOutcome, OverlayError> {
        if self.effective_reachability(id).is_reachable() {
            return Ok(ProbeOutcome::AlreadyReachable);
        }
        let sid = *self.subscriber(id)?.sid();

        let Some(host) = self.config.host_for(&sid) else {
            return Ok(ProbeOutcome::NotConfigured);
        };

        let interface = match &host.interface {
            Some(name) => Some(
                self.services
                    .find_interface(name)
                    .ok_or_else(|| OverlayError::InterfaceNotFound(name.clone()))?,
            ),
            None => None,
        };
        let addr = host.socket_addr();

        debug!(sid = %sid, addr = %addr, "Probing configured host");
        self.services.send_probe(&sid, addr, interface)?;
        Ok(ProbeOutcome::ProbeSent)
    }
}
