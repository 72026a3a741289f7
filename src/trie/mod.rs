//! Subscriber Trie
//!
//! 16-ary radix index over SID nibbles. The trie owns every subscriber
//! record; slots refer to records by `SubscriberId`.
//!
//! A leaf sits at the shallowest nibble depth where its address is unique
//! among the addresses known so far. Inserting a colliding address pushes
//! the existing leaf one nibble deeper until the two diverge, so a leaf's
//! depth (cached as `abbreviate_len`) is always the current uniqueness depth.
//!
//! Abbreviated lookups never create records and never guess: a prefix that
//! stops inside a shared path is reported as `Ambiguous`.

mod node;

use std::ops::ControlFlow;

use thiserror::Error;
use tracing::debug;

use crate::identity::{nibble_at, SID_NIBBLES};
use crate::subscriber::{Subscriber, SubscriberId};
use crate::{IdentityError, Sid, SID_SIZE};

use node::{Slot, TrieNode};

pub use node::TRIE_FANOUT;

/// Errors related to trie operations.
#[derive(Debug, Error)]
pub enum TrieError {
    #[error("invalid prefix length: {0} (expected 1..=32)")]
    InvalidPrefixLength(usize),

    #[error("subscriber table full: max {max} entries")]
    Full { max: usize },

    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
}

/// Result of resolving a (possibly abbreviated) address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    /// Exactly one subscriber matches.
    Found(SubscriberId),
    /// No known subscriber matches.
    Unknown,
    /// The prefix is shared by more than one known subscriber.
    Ambiguous,
}

impl Lookup {
    /// The matched subscriber, if resolution succeeded.
    pub fn subscriber(self) -> Option<SubscriberId> {
        match self {
            Lookup::Found(id) => Some(id),
            Lookup::Unknown | Lookup::Ambiguous => None,
        }
    }
}

/// Index and owner of all known subscribers.
#[derive(Debug, Default)]
pub struct SubscriberTrie {
    root: TrieNode,
    subscribers: Vec<Subscriber>,
    max_subscribers: Option<usize>,
}

impl SubscriberTrie {
    /// Create an empty trie with no capacity limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty trie that refuses to grow beyond `max` subscribers.
    pub fn with_max_subscribers(max: usize) -> Self {
        Self {
            max_subscribers: Some(max),
            ..Self::default()
        }
    }

    /// Number of known subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if no subscriber is known.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Capacity limit, if any.
    pub fn max_subscribers(&self) -> Option<usize> {
        self.max_subscribers
    }

    /// Number of index nodes, the root included.
    pub fn node_count(&self) -> usize {
        count_nodes(&self.root)
    }

    /// Get a subscriber record.
    pub fn get(&self, id: SubscriberId) -> Option<&Subscriber> {
        self.subscribers.get(id.index())
    }

    /// Get a mutable subscriber record.
    pub fn get_mut(&mut self, id: SubscriberId) -> Option<&mut Subscriber> {
        self.subscribers.get_mut(id.index())
    }

    /// All subscribers in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (SubscriberId, &Subscriber)> {
        self.subscribers
            .iter()
            .enumerate()
            .map(|(i, sub)| (SubscriberId::new(i), sub))
    }

    /// Resolve a whole or abbreviated address without creating anything.
    pub fn find(&self, prefix: &[u8]) -> Result<Lookup, TrieError> {
        check_prefix_len(prefix)?;

        let mut node = &self.root;
        for pos in 0..prefix.len() * 2 {
            match &node.slots[nibble_at(prefix, pos)] {
                Slot::Node(child) => node = &**child,
                Slot::Empty => return Ok(Lookup::Unknown),
                Slot::Leaf(id) => {
                    // The only candidate under this path; it must carry the
                    // whole prefix, not just the nibbles walked so far.
                    let matched = self.subscribers[id.index()].sid().starts_with(prefix);
                    return Ok(if matched { Lookup::Found(*id) } else { Lookup::Unknown });
                }
            }
        }

        // Prefix exhausted while still inside a shared path.
        Ok(Lookup::Ambiguous)
    }

    /// Find the subscriber for a full address, creating it if unknown.
    pub fn find_or_create(&mut self, sid: &Sid) -> Result<SubscriberId, TrieError> {
        let limit = self.max_subscribers;
        insert(&mut self.root, &mut self.subscribers, limit, sid, 0)
    }

    /// Resolve an address prefix, creating a record when `create` is set and
    /// the prefix is a full address.
    ///
    /// Abbreviations never create records.
    pub fn lookup_or_create(&mut self, prefix: &[u8], create: bool) -> Result<Lookup, TrieError> {
        if create && prefix.len() == SID_SIZE {
            let sid = Sid::from_slice(prefix)?;
            return self.find_or_create(&sid).map(Lookup::Found);
        }
        self.find(prefix)
    }

    /// Current uniqueness depth of `sid` in nibbles, read from the index
    /// rather than the cached `abbreviate_len`.
    pub fn leaf_depth(&self, sid: &Sid) -> Option<usize> {
        let mut node = &self.root;
        for pos in 0..SID_NIBBLES {
            match &node.slots[sid.nibble(pos)] {
                Slot::Node(child) => node = &**child,
                Slot::Empty => return None,
                Slot::Leaf(id) => {
                    return (self.subscribers[id.index()].sid() == sid).then_some(pos + 1);
                }
            }
        }
        None
    }

    /// In-order traversal of the subscribers in the address range bounded by
    /// `start` and `end` (both prefixes, both inclusive).
    ///
    /// The visitor returns `ControlFlow::Break` to stop early; the return
    /// value reports whether it did.
    pub fn walk<F>(&self, start: Option<&[u8]>, end: Option<&[u8]>, mut visitor: F) -> bool
    where
        F: FnMut(SubscriberId, &Subscriber) -> ControlFlow<()>,
    {
        self.walk_node(&self.root, 0, start, end, &mut visitor)
            .is_break()
    }

    /// All subscribers whose address starts with `prefix`, in address order.
    pub fn matching(&self, prefix: &[u8]) -> Vec<SubscriberId> {
        let mut found = Vec::new();
        self.walk(Some(prefix), Some(prefix), |id, _| {
            found.push(id);
            ControlFlow::Continue(())
        });
        found
    }

    /// All subscribers at or after `start`, in address order.
    pub fn enumerate_from(&self, start: &Sid) -> Vec<SubscriberId> {
        let mut found = Vec::new();
        self.walk(Some(start.as_bytes()), None, |id, _| {
            found.push(id);
            ControlFlow::Continue(())
        });
        found
    }

    fn walk_node<F>(
        &self,
        node: &TrieNode,
        pos: usize,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        visitor: &mut F,
    ) -> ControlFlow<()>
    where
        F: FnMut(SubscriberId, &Subscriber) -> ControlFlow<()>,
    {
        let first = match start {
            Some(s) if pos < s.len() * 2 => nibble_at(s, pos),
            _ => 0,
        };
        let last = match end {
            Some(e) if pos < e.len() * 2 => nibble_at(e, pos),
            _ => TRIE_FANOUT - 1,
        };

        for i in first..=last {
            // Bounds only constrain the outermost branches.
            let lower = if i == first { start } else { None };
            let upper = if i == last { end } else { None };

            match &node.slots[i] {
                Slot::Empty => {}
                Slot::Node(child) => self.walk_node(child, pos + 1, lower, upper, visitor)?,
                Slot::Leaf(id) => {
                    let sub = &self.subscribers[id.index()];
                    if in_range(sub.sid(), lower, upper) {
                        visitor(*id, sub)?;
                    }
                }
            }
        }
        ControlFlow::Continue(())
    }
}

fn check_prefix_len(prefix: &[u8]) -> Result<(), TrieError> {
    if prefix.is_empty() || prefix.len() > SID_SIZE {
        return Err(TrieError::InvalidPrefixLength(prefix.len()));
    }
    Ok(())
}

/// A leaf is reached as soon as its path is unique, which can be before the
/// bound prefixes are exhausted; compare the remaining bytes explicitly.
fn in_range(sid: &Sid, start: Option<&[u8]>, end: Option<&[u8]>) -> bool {
    let bytes = sid.as_bytes();
    let above = start.is_none_or(|s| bytes[..s.len().min(SID_SIZE)] >= *s);
    let below = end.is_none_or(|e| bytes[..e.len().min(SID_SIZE)] <= *e);
    above && below
}

fn count_nodes(node: &TrieNode) -> usize {
    let children: usize = node
        .slots
        .iter()
        .map(|slot| match slot {
            Slot::Node(child) => count_nodes(child),
            Slot::Empty | Slot::Leaf(_) => 0,
        })
        .sum();
    1 + children
}

fn ensure_capacity(subscribers: &[Subscriber], limit: Option<usize>) -> Result<(), TrieError> {
    let max = limit.unwrap_or(u32::MAX as usize).min(u32::MAX as usize);
    if subscribers.len() >= max {
        return Err(TrieError::Full { max });
    }
    Ok(())
}

fn insert(
    node: &mut TrieNode,
    subscribers: &mut Vec<Subscriber>,
    limit: Option<usize>,
    sid: &Sid,
    pos: usize,
) -> Result<SubscriberId, TrieError> {
    debug_assert!(pos < SID_NIBBLES);
    let depth = pos + 1;
    let slot = &mut node.slots[sid.nibble(pos)];

    match slot {
        Slot::Node(child) => insert(child, subscribers, limit, sid, depth),
        Slot::Empty => {
            ensure_capacity(subscribers, limit)?;
            let id = SubscriberId::new(subscribers.len());
            subscribers.push(Subscriber::new(*sid, depth));
            *slot = Slot::Leaf(id);
            debug!(sid = %sid, abbreviate_len = depth, "New subscriber");
            Ok(id)
        }
        Slot::Leaf(existing) => {
            let existing = *existing;
            let existing_sid = *subscribers[existing.index()].sid();
            if existing_sid == *sid {
                return Ok(existing);
            }

            // Refuse before restructuring so a full table is left untouched.
            ensure_capacity(subscribers, limit)?;

            let mut child = Box::new(TrieNode::default());
            child.slots[existing_sid.nibble(depth)] = Slot::Leaf(existing);
            subscribers[existing.index()].set_abbreviate_len(depth + 1);

            let id = insert(&mut child, subscribers, limit, sid, depth)?;
            *slot = Slot::Node(child);
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests;
