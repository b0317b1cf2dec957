use glasswall_core::{Role, RoomIdError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("invalid room code: {0}")]
    InvalidRoom(#[from] RoomIdError),

    #[error("failed to connect to signaling server: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("{0} is not allowed to change privacy mode")]
    NotPermitted(Role),

    #[error("room session is closed")]
    Closed,
}
