use glasswall_client::signaling::SignalingOutput;
use glasswall_core::SignalEnvelope;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// SignalingOutput that captures every outgoing envelope.
#[derive(Clone, Default)]
pub struct MockSignalingOutput {
    sent: Arc<Mutex<Vec<SignalEnvelope>>>,
    closed: Arc<AtomicUsize>,
}

impl MockSignalingOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<SignalEnvelope> {
        self.sent.lock().unwrap().clone()
    }

    /// Envelopes of the given `type` tag, in send order.
    pub fn sent_of_kind(&self, kind: &str) -> Vec<SignalEnvelope> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.kind() == kind)
            .cloned()
            .collect()
    }

    pub fn close_count(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }
}

impl SignalingOutput for MockSignalingOutput {
    fn send(&self, envelope: SignalEnvelope) {
        tracing::debug!("[MockSignaling] send {}", envelope.kind());
        self.sent.lock().unwrap().push(envelope);
    }

    fn close(&self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_signaling_captures_envelopes() {
        let signaling = MockSignalingOutput::new();
        signaling.send(SignalEnvelope::privacy(true));
        signaling.send(SignalEnvelope::offer("b1".into(), "v=0".into()));

        assert_eq!(signaling.sent().len(), 2);
        assert_eq!(signaling.sent_of_kind("offer").len(), 1);
        assert_eq!(signaling.close_count(), 0);
    }
}
