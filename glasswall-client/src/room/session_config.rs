use crate::signaling::signaling_endpoint;
use crate::transport::TransportConfig;
use glasswall_core::utils::DEFAULT_SIGNALING_URL;
use glasswall_core::{ParticipantId, Role, RoomId};

/// Everything needed to join one room.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base websocket address of the signaling server, without the `/ws` path.
    pub signaling_url: String,
    pub room_id: RoomId,
    pub role: Role,
    pub participant_id: ParticipantId,
    pub transport: TransportConfig,
}

impl SessionConfig {
    /// Default server, default ICE servers and a fresh random participant id.
    pub fn new(room_id: RoomId, role: Role) -> Self {
        Self {
            signaling_url: DEFAULT_SIGNALING_URL.to_owned(),
            room_id,
            role,
            participant_id: ParticipantId::random(),
            transport: TransportConfig::default(),
        }
    }

    pub fn with_signaling_url(mut self, url: impl Into<String>) -> Self {
        self.signaling_url = url.into();
        self
    }

    pub fn with_participant_id(mut self, id: ParticipantId) -> Self {
        self.participant_id = id;
        self
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn endpoint(&self) -> String {
        signaling_endpoint(
            &self.signaling_url,
            &self.room_id,
            self.role,
            &self.participant_id,
        )
    }
}
