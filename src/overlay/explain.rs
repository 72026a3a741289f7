//! Please-explain request building, dispatch and handling.

use super::{DecodeContext, Overlay, OverlayError};
use crate::protocol::{
    ExplainPayload, ExplainRecord, FrameType, OverlayFrame, PLEASE_EXPLAIN_BROADCAST_TTL,
    QueuePriority, parse_explain_records,
};
use crate::services::OverlayServices;
use crate::subscriber::{Reachability, SubscriberId};
use tracing::{debug, info, warn};

impl<S: OverlayServices> Overlay<S> {
    /// Queue an explanation request for an abbreviation we could not resolve.
    ///
    /// Every known subscriber under the prefix is listed first, so the
    /// sender learns which of its abbreviations are too short, followed by
    /// the abbreviation itself.
    pub(super) fn request_explanation(&mut self, ctx: &mut DecodeContext, prefix: &[u8]) {
        let mtu = self.config.overlay.explain_mtu();
        let payload = ctx
            .please_explain
            .get_or_insert_with(|| ExplainPayload::new(mtu));

        self.add_explain_responses(payload, prefix);

        info!(prefix = %hex::encode(prefix), "Asking for explanation");
        if let Err(e) = payload.push(prefix) {
            warn!(prefix = %hex::encode(prefix), error = %e, "Dropping explanation request");
        }
    }

    /// Append the full address of every subscriber under `prefix`.
    ///
    /// Stops at the first record that no longer fits. Our own identities
    /// listed here will send their full address on the next packet.
    fn add_explain_responses(&mut self, payload: &mut ExplainPayload, prefix: &[u8]) -> usize {
        let mut added = 0;
        for id in self.trie.matching(prefix) {
            let Some(sub) = self.trie.get_mut(id) else {
                continue;
            };
            if sub.reachable() == Reachability::SelfNode {
                sub.set_send_full(true);
            }

            debug!(sid = %sub.sid(), "Adding full sid by way of explanation");
            if let Err(e) = payload.push_sid(sub.sid()) {
                debug!(error = %e, "Please-explain payload full");
                break;
            }
            added += 1;
        }
        added
    }

    /// Send the please-explain accumulated in `ctx`, if any.
    ///
    /// The frame is sent from `source` (our local identity by default),
    /// which will also repeat its full address on the next packet. A
    /// reachable destination gets a routed frame; otherwise the frame is
    /// flooded one hop with a fresh broadcast id, on the interface the
    /// triggering packet arrived on when known.
    ///
    /// Returns whether a frame was queued.
    pub fn send_please_explain(
        &mut self,
        ctx: &mut DecodeContext,
        source: Option<SubscriberId>,
        destination: Option<SubscriberId>,
    ) -> Result<bool, OverlayError> {
        if ctx.please_explain.is_none() {
            return Ok(false);
        }
        let source = source.or(self.local).ok_or(OverlayError::NoLocalIdentity)?;
        let (dest_sid, dest_reachable) = match destination {
            Some(id) => {
                let dest = self.subscriber(id)?;
                (Some(*dest.sid()), dest.reachable().is_reachable())
            }
            None => (None, false),
        };

        let source_sub = self.subscriber_mut(source)?;
        source_sub.set_send_full(true);
        let source_sid = *source_sub.sid();

        let payload = ctx
            .please_explain
            .take()
            .map(ExplainPayload::into_bytes)
            .unwrap_or_default();
        let mut frame = OverlayFrame::new(FrameType::PleaseExplain, source_sid, payload);
        frame.destination = dest_sid;
        frame.queue = QueuePriority::MeshManagement;

        if dest_reachable {
            frame.ttl = self.config.overlay.unicast_ttl();
        } else {
            frame.ttl = PLEASE_EXPLAIN_BROADCAST_TTL;
            frame.broadcast_id = Some(self.generate_broadcast_id());
            if let Some(interface) = ctx.interface {
                frame.next_hop = dest_sid;
                frame.interface = Some(interface);
                frame.recv_addr = ctx.recv_addr;
            }
        }

        debug!(
            source = %source_sid,
            destination = ?dest_sid,
            ttl = frame.ttl,
            len = frame.payload.len(),
            broadcast = frame.is_broadcast(),
            "Sending please-explain"
        );
        self.services.enqueue(frame)?;
        Ok(true)
    }

    /// Handle a received please-explain.
    ///
    /// Full addresses are learned. Abbreviations are answered with every
    /// matching subscriber we know, sent back from the frame's destination
    /// to its source. The payload is validated as a whole before anything
    /// is applied.
    ///
    /// Returns whether a reply was queued.
    pub fn process_explain(
        &mut self,
        source: SubscriberId,
        destination: Option<SubscriberId>,
        payload: &[u8],
    ) -> Result<bool, OverlayError> {
        let records = parse_explain_records(payload)?;
        let mtu = self.config.overlay.explain_mtu();
        let mut reply = ExplainPayload::new(mtu);

        for record in records {
            match record {
                ExplainRecord::Introduction(sid) => {
                    self.trie.find_or_create(&sid)?;
                }
                ExplainRecord::Request(prefix) => {
                    info!(prefix = %hex::encode(prefix), "Sending responses");
                    self.add_explain_responses(&mut reply, prefix);
                }
            }
        }

        let mut ctx = DecodeContext::new();
        if !reply.is_empty() {
            ctx.please_explain = Some(reply);
        }
        self.send_please_explain(&mut ctx, destination, Some(source))
    }
}
