use crate::room::StateStore;
use crate::signaling::SignalingOutput;
use glasswall_core::SignalEnvelope;
use std::sync::Arc;
use tracing::info;

/// Keeps the room-wide privacy flag in sync with the other participants.
///
/// The flag is advisory: it only changes what the UI presents and never
/// touches a transport.
#[derive(Clone)]
pub struct PrivacyBroadcaster {
    state: StateStore,
    signaling: Arc<dyn SignalingOutput>,
}

impl PrivacyBroadcaster {
    pub fn new(state: StateStore, signaling: Arc<dyn SignalingOutput>) -> Self {
        Self { state, signaling }
    }

    /// Applies `is_active` locally and tells the room about it.
    pub fn toggle(&self, is_active: bool) {
        self.state.update(|s| s.privacy_mode = is_active);
        self.signaling.send(SignalEnvelope::privacy(is_active));
        info!("Privacy mode set to {} locally", is_active);
    }

    /// Last received value wins.
    pub fn on_remote_toggle(&self, is_active: bool) {
        self.state.update(|s| s.privacy_mode = is_active);
        info!("Privacy mode set to {} by remote", is_active);
    }

    pub fn is_active(&self) -> bool {
        self.state.snapshot().privacy_mode
    }
}
