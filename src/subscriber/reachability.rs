//! How a subscriber can currently be sent a packet.

use std::fmt;

/// Reachability state of a subscriber.
///
/// `Unicast` and `Broadcast` are the direct states; either may carry the
/// `assumed` modifier while reachability is speculative and not yet
/// confirmed by traffic from the subscriber.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Reachability {
    /// Not reachable.
    #[default]
    None,
    /// One of our own identities.
    SelfNode,
    /// Reachable through another subscriber acting as next hop.
    Indirect,
    /// Directly reachable by unicast on a bound interface.
    Unicast { assumed: bool },
    /// Directly reachable by link broadcast on a bound interface.
    Broadcast { assumed: bool },
}

impl Reachability {
    /// Confirmed unicast reachability.
    pub const UNICAST: Self = Self::Unicast { assumed: false };

    /// Confirmed broadcast reachability.
    pub const BROADCAST: Self = Self::Broadcast { assumed: false };

    /// Check if this state implies a direct link.
    pub fn is_direct(&self) -> bool {
        matches!(self, Self::Unicast { .. } | Self::Broadcast { .. })
    }

    /// Check if this is a speculative direct state.
    pub fn is_assumed(&self) -> bool {
        matches!(
            self,
            Self::Unicast { assumed: true } | Self::Broadcast { assumed: true }
        )
    }

    /// Check if packets can be routed to this subscriber (directly or
    /// through a next hop).
    pub fn is_reachable(&self) -> bool {
        self.is_direct() || matches!(self, Self::Indirect)
    }

    /// Same state with the assumed modifier applied.
    ///
    /// Has no effect on non-direct states.
    pub fn assumed(self) -> Self {
        match self {
            Self::Unicast { .. } => Self::Unicast { assumed: true },
            Self::Broadcast { .. } => Self::Broadcast { assumed: true },
            other => other,
        }
    }
}

impl fmt::Display for Reachability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::None => "not reachable",
            Self::SelfNode => "self",
            Self::Indirect => "reachable indirectly",
            Self::Unicast { assumed: false } => "reachable via unicast",
            Self::Broadcast { assumed: false } => "reachable via broadcast",
            Self::Unicast { assumed: true } => "assumed reachable via unicast",
            Self::Broadcast { assumed: true } => "assumed reachable via broadcast",
        };
        write!(f, "{}", s)
    }
}
