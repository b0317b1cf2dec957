pub use glasswall_core::model::{ParticipantId, Role, RoomId, SignalEnvelope};

pub mod model {
    pub use glasswall_core::model::*;
}

pub mod utils {
    pub use glasswall_core::utils::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use glasswall_client::*;
}
