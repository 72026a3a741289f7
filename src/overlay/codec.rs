//! Address abbreviation encode/decode.

use std::net::SocketAddr;

use super::{Overlay, OverlayError};
use crate::protocol::{ExplainPayload, OA_CODE_PREVIOUS, OA_CODE_SELF, ProtocolError, WireReader};
use crate::services::{InterfaceId, OverlayServices};
use crate::subscriber::{Reachability, Subscriber, SubscriberId};
use crate::SID_SIZE;
use tracing::{info, trace};

/// Per-packet address state, shared by every address field of one packet.
///
/// Created when a packet starts being parsed or built and dropped when it
/// is done; a pending please-explain is handed to
/// `Overlay::send_please_explain` before that.
#[derive(Clone, Debug, Default)]
pub struct DecodeContext {
    /// Declared sender of the packet, target of the self marker.
    pub sender: Option<SubscriberId>,
    /// Last address written or resolved, target of the previous marker.
    pub previous: Option<SubscriberId>,
    /// Some address in this packet could not be resolved.
    pub invalid_addresses: bool,
    /// Please-explain being accumulated for this packet.
    pub please_explain: Option<ExplainPayload>,
    /// Interface the packet arrived on.
    pub interface: Option<InterfaceId>,
    /// Link address the packet arrived from.
    pub recv_addr: Option<SocketAddr>,
}

impl DecodeContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context for a packet from a known sender.
    pub fn with_sender(sender: SubscriberId) -> Self {
        Self {
            sender: Some(sender),
            ..Self::default()
        }
    }

    /// Record where the packet was received.
    pub fn received_on(mut self, interface: InterfaceId, addr: SocketAddr) -> Self {
        self.interface = Some(interface);
        self.recv_addr = Some(addr);
        self
    }

    /// Check if a please-explain is waiting to be sent.
    pub fn has_pending_explain(&self) -> bool {
        self.please_explain.is_some()
    }
}

/// Bytes of address to send for a subscriber, from its uniqueness depth.
///
/// Covers one nibble past the uniqueness depth; our own identities get one
/// extra byte on top.
pub(super) fn abbreviated_len(sub: &Subscriber) -> usize {
    let mut len = (sub.abbreviate_len() + 2) / 2;
    if sub.reachable() == Reachability::SelfNode {
        len += 1;
    }
    len.min(SID_SIZE)
}

impl<S: OverlayServices> Overlay<S> {
    /// Append the shortest safe reference to a subscriber.
    ///
    /// Emits the self marker for the packet's sender, the previous marker
    /// for a repeat of the last address, and a length-prefixed abbreviation
    /// otherwise. A pending `send_full` forces the whole address once.
    pub fn append_address(
        &mut self,
        ctx: &mut DecodeContext,
        buf: &mut Vec<u8>,
        id: SubscriberId,
    ) -> Result<(), OverlayError> {
        let sub = self.subscriber_mut(id)?;

        if ctx.sender == Some(id) {
            buf.push(OA_CODE_SELF);
        } else if ctx.previous == Some(id) {
            buf.push(OA_CODE_PREVIOUS);
        } else {
            let len = if sub.send_full() {
                sub.set_send_full(false);
                SID_SIZE
            } else {
                abbreviated_len(sub)
            };
            trace!(sid = %sub.sid(), len, "Appending address");
            buf.push(len as u8);
            buf.extend_from_slice(sub.sid().abbreviation(len));
        }

        ctx.previous = Some(id);
        Ok(())
    }

    /// Read one address reference.
    ///
    /// Returns `Ok(None)` for a reference that cannot be resolved yet; the
    /// context is marked invalid and, for an unknown or ambiguous
    /// abbreviation, a please-explain entry is queued. Truncated input and
    /// out-of-range lengths are errors.
    pub fn parse_address(
        &mut self,
        ctx: &mut DecodeContext,
        reader: &mut WireReader<'_>,
    ) -> Result<Option<SubscriberId>, OverlayError> {
        match reader.get_u8()? {
            OA_CODE_SELF => match ctx.sender {
                Some(sender) => {
                    ctx.previous = Some(sender);
                    Ok(Some(sender))
                }
                None => {
                    info!("Could not resolve address, sender has not been set");
                    ctx.invalid_addresses = true;
                    Ok(None)
                }
            },
            OA_CODE_PREVIOUS => match ctx.previous {
                Some(previous) => Ok(Some(previous)),
                None => {
                    info!("Unable to decode previous address");
                    ctx.invalid_addresses = true;
                    Ok(None)
                }
            },
            len => self.parse_abbreviation(ctx, reader, len),
        }
    }

    fn parse_abbreviation(
        &mut self,
        ctx: &mut DecodeContext,
        reader: &mut WireReader<'_>,
        len: u8,
    ) -> Result<Option<SubscriberId>, OverlayError> {
        if len == 0 || len as usize > SID_SIZE {
            return Err(ProtocolError::InvalidAbbreviationLength(len).into());
        }
        let prefix = reader.get_bytes(len as usize)?;

        match self.trie.lookup_or_create(prefix, true)?.subscriber() {
            Some(id) => {
                trace!(subscriber = %id, len, "Resolved address");
                ctx.previous = Some(id);
                Ok(Some(id))
            }
            None => {
                ctx.invalid_addresses = true;
                self.request_explanation(ctx, prefix);
                Ok(None)
            }
        }
    }
}
