use glasswall_core::SignalEnvelope;

/// Outbound half of the signaling channel.
///
/// Sending never blocks and never fails loudly: when the channel is not open
/// the envelope is dropped and a warning is logged.
pub trait SignalingOutput: Send + Sync {
    fn send(&self, envelope: SignalEnvelope);

    /// Ask the channel to close normally.
    fn close(&self) {}
}
