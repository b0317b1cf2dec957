use crate::peer::PeerState;
use crate::transport::{IceState, LocalMedia, RemoteTrack};
use glasswall_core::{ParticipantId, Role, RoomId};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Coarse lifecycle of the room session, next to the free-form status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Connecting,
    Connected,
    Disconnected,
    Left,
}

#[derive(Debug, Clone)]
pub struct RemoteParticipant {
    pub label: String,
    pub peer_state: PeerState,
    pub ice_state: Option<IceState>,
    pub tracks: Vec<RemoteTrack>,
}

impl RemoteParticipant {
    pub fn new(id: &ParticipantId) -> Self {
        Self {
            label: format!("Remote User ({})", id.short()),
            peer_state: PeerState::Idle,
            ice_state: None,
            tracks: Vec::new(),
        }
    }
}

/// Everything the UI renders for a room. Only the session writes to it.
#[derive(Debug, Clone)]
pub struct RoomSessionState {
    pub room_id: RoomId,
    pub role: Role,
    pub local_id: ParticipantId,
    pub local_media: LocalMedia,
    pub remotes: BTreeMap<ParticipantId, RemoteParticipant>,
    pub privacy_mode: bool,
    pub status: String,
    pub phase: SessionPhase,
}

impl RoomSessionState {
    pub fn new(room_id: RoomId, role: Role, local_id: ParticipantId, local_media: LocalMedia) -> Self {
        Self {
            room_id,
            role,
            local_id,
            local_media,
            remotes: BTreeMap::new(),
            privacy_mode: false,
            status: "Initializing...".to_owned(),
            phase: SessionPhase::Connecting,
        }
    }

    /// Whether remote audio/video must be withheld from this participant.
    ///
    /// Privacy mode only silences the candidate side; interviewers keep
    /// seeing and hearing everyone.
    pub fn remote_media_gated(&self) -> bool {
        self.privacy_mode && self.role == Role::Candidate
    }

    /// Status line for the least connected peer that has reported ICE.
    ///
    /// `Media Connected` only once every such peer is connected; errors win
    /// over peers that are still checking.
    pub fn ice_status(&self) -> Option<String> {
        let states: Vec<IceState> = self.remotes.values().filter_map(|r| r.ice_state).collect();
        let worst = states
            .iter()
            .find(|s| matches!(s, IceState::Failed | IceState::Disconnected))
            .or_else(|| states.iter().find(|s| !s.is_connected()))
            .or_else(|| states.first())?;
        Some(worst.status_line())
    }
}

/// Shared handle to the observable [`RoomSessionState`].
#[derive(Clone)]
pub struct StateStore {
    tx: Arc<watch::Sender<RoomSessionState>>,
}

impl StateStore {
    pub fn new(initial: RoomSessionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn update<F>(&self, modify: F)
    where
        F: FnOnce(&mut RoomSessionState),
    {
        self.tx.send_modify(modify);
    }

    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|s| s.status = status);
    }

    pub fn snapshot(&self) -> RoomSessionState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoomSessionState> {
        self.tx.subscribe()
    }
}
