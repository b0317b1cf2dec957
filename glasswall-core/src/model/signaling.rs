use crate::model::ice::IceCandidate;
use crate::model::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Type-specific part of a signaling message, tagged by the `type` field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalPayload {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        #[serde(default)]
        candidate: Option<IceCandidate>,
    },
    UserJoined {
        id: ParticipantId,
    },
    UserLeft {
        id: ParticipantId,
    },
    #[serde(alias = "toggle_privacy", alias = "privacy_state_change")]
    PrivacyToggle {
        is_active: bool,
    },
    /// Any tag this client does not know about.
    #[serde(other)]
    Unknown,
}

impl SignalPayload {
    pub fn kind(&self) -> &'static str {
        match self {
            SignalPayload::Offer { .. } => "offer",
            SignalPayload::Answer { .. } => "answer",
            SignalPayload::Candidate { .. } => "candidate",
            SignalPayload::UserJoined { .. } => "user-joined",
            SignalPayload::UserLeft { .. } => "user-left",
            SignalPayload::PrivacyToggle { .. } => "privacy-toggle",
            SignalPayload::Unknown => "unknown",
        }
    }
}

/// One JSON message on the signaling channel.
///
/// `sender` is filled in by the server on relayed messages, `target` is set by
/// the client on messages addressed to a single peer. Fields that are not
/// recognised are ignored when decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SignalEnvelope {
    #[serde(flatten)]
    pub payload: SignalPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<ParticipantId>,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvelopeError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl SignalEnvelope {
    pub fn new(payload: SignalPayload) -> Self {
        Self {
            payload,
            sender: None,
            target: None,
        }
    }

    pub fn offer(target: ParticipantId, sdp: String) -> Self {
        Self::new(SignalPayload::Offer { sdp }).to(target)
    }

    pub fn answer(target: ParticipantId, sdp: String) -> Self {
        Self::new(SignalPayload::Answer { sdp }).to(target)
    }

    pub fn candidate(target: ParticipantId, candidate: IceCandidate) -> Self {
        Self::new(SignalPayload::Candidate {
            candidate: Some(candidate),
        })
        .to(target)
    }

    pub fn privacy(is_active: bool) -> Self {
        Self::new(SignalPayload::PrivacyToggle { is_active })
    }

    pub fn user_joined(id: ParticipantId) -> Self {
        Self::new(SignalPayload::UserJoined { id })
    }

    pub fn user_left(id: ParticipantId) -> Self {
        Self::new(SignalPayload::UserLeft { id })
    }

    pub fn to(mut self, target: ParticipantId) -> Self {
        self.target = Some(target);
        self
    }

    pub fn with_sender(mut self, sender: ParticipantId) -> Self {
        self.sender = Some(sender);
        self
    }

    pub fn kind(&self) -> &'static str {
        self.payload.kind()
    }

    pub fn decode(text: &str) -> Result<Self, EnvelopeError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn encode(&self) -> Result<String, EnvelopeError> {
        Ok(serde_json::to_string(self)?)
    }
}
