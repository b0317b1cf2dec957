use std::fmt;

/// Which side of the current offer/answer round this peer is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationRole {
    Offering,
    Answering,
}

/// Lifecycle of a [`PeerSession`](crate::peer::PeerSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Idle,
    Negotiating(NegotiationRole),
    Active,
    Closing,
    Closed,
    Failed,
}

impl PeerState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PeerState::Closed | PeerState::Failed)
    }

    /// A session that is being or has been torn down accepts no more signaling.
    pub fn is_shutting_down(&self) -> bool {
        matches!(
            self,
            PeerState::Closing | PeerState::Closed | PeerState::Failed
        )
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeerState::Idle => f.write_str("idle"),
            PeerState::Negotiating(NegotiationRole::Offering) => f.write_str("negotiating (offering)"),
            PeerState::Negotiating(NegotiationRole::Answering) => {
                f.write_str("negotiating (answering)")
            }
            PeerState::Active => f.write_str("active"),
            PeerState::Closing => f.write_str("closing"),
            PeerState::Closed => f.write_str("closed"),
            PeerState::Failed => f.write_str("failed"),
        }
    }
}
