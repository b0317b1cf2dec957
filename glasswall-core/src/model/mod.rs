mod ice;
mod participant;
mod role;
mod room;
mod signaling;

pub use ice::{IceCandidate, IceServerConfig};
pub use participant::ParticipantId;
pub use role::{Role, RoleParseError};
pub use room::{RoomId, RoomIdError};
pub use signaling::{EnvelopeError, SignalEnvelope, SignalPayload};
