use crate::transport::SdpKind;
use anyhow::Result;
use glasswall_core::ParticipantId;

/// Result of an asynchronous negotiation step, posted back to the room actor.
///
/// `generation` is the round the step was started for; the actor drops the
/// result when the session has moved on or no longer exists.
#[derive(Debug)]
pub enum NegotiationEvent {
    OfferCreated {
        participant: ParticipantId,
        generation: u64,
        result: Result<String>,
    },
    RemoteDescriptionApplied {
        participant: ParticipantId,
        generation: u64,
        kind: SdpKind,
        result: Result<()>,
    },
    AnswerCreated {
        participant: ParticipantId,
        generation: u64,
        result: Result<String>,
    },
}

impl NegotiationEvent {
    pub fn participant(&self) -> &ParticipantId {
        match self {
            NegotiationEvent::OfferCreated { participant, .. }
            | NegotiationEvent::RemoteDescriptionApplied { participant, .. }
            | NegotiationEvent::AnswerCreated { participant, .. } => participant,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            NegotiationEvent::OfferCreated { generation, .. }
            | NegotiationEvent::RemoteDescriptionApplied { generation, .. }
            | NegotiationEvent::AnswerCreated { generation, .. } => *generation,
        }
    }
}
