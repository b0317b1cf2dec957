pub mod negotiation;
pub mod peer;
pub mod privacy;
pub mod room;
pub mod signaling;
pub mod transport;

pub use room::{RoomSession, RoomSessionState, SessionConfig, SessionError, SessionPhase};
pub use transport::{LocalMedia, TransportConfig};
