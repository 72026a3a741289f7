//! Trie nodes and slots.

use crate::subscriber::SubscriberId;

/// Branching factor: one slot per nibble value.
pub const TRIE_FANOUT: usize = 16;

/// One child position of a trie node.
#[derive(Debug, Default)]
pub(crate) enum Slot {
    /// Nothing stored under this nibble.
    #[default]
    Empty,
    /// Two or more subscribers share this nibble path.
    Node(Box<TrieNode>),
    /// Exactly one subscriber lives under this nibble path.
    Leaf(SubscriberId),
}

/// Internal index node with 16 child slots.
///
/// Nodes are only created when two addresses collide at a nibble depth, so
/// every node other than the root has at least two occupied slots beneath it.
#[derive(Debug, Default)]
pub(crate) struct TrieNode {
    pub(crate) slots: [Slot; TRIE_FANOUT],
}

#[cfg(test)]
impl TrieNode {
    /// Bitmask of slots holding nested nodes (bit n = slot n).
    pub(crate) fn node_mask(&self) -> u16 {
        self.mask_where(|slot| matches!(slot, Slot::Node(_)))
    }

    /// Bitmask of slots holding subscribers (bit n = slot n).
    pub(crate) fn leaf_mask(&self) -> u16 {
        self.mask_where(|slot| matches!(slot, Slot::Leaf(_)))
    }

    fn mask_where(&self, pred: impl Fn(&Slot) -> bool) -> u16 {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| pred(slot))
            .fold(0u16, |mask, (i, _)| mask | (1 << i))
    }
}
