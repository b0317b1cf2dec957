use glasswall_core::IceServerConfig;
use glasswall_core::utils::{
    DEFAULT_STUN_ADDR, DEFAULT_STUN_ADDR_2, DEFAULT_STUN_ADDR_3, DEFAULT_STUN_ADDR_4,
};

/// ICE configuration shared by every peer connection of a room session.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub ice_servers: Vec<IceServerConfig>,
}

impl TransportConfig {
    pub fn with_ice_servers(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig::stun([
                DEFAULT_STUN_ADDR,
                DEFAULT_STUN_ADDR_2,
                DEFAULT_STUN_ADDR_3,
                DEFAULT_STUN_ADDR_4,
            ])],
        }
    }
}
