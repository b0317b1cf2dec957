use crate::signaling::SignalingOutput;
use futures::{SinkExt, StreamExt};
use glasswall_core::{ParticipantId, Role, RoomId, SignalEnvelope};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tracing::{debug, error, info, warn};

/// Close code reported when the connection ends without a close frame.
pub const ABNORMAL_CLOSE: u16 = 1006;

/// Close code of an orderly shutdown.
pub const NORMAL_CLOSE: u16 = 1000;

/// What the signaling connection reports to the room session.
#[derive(Debug)]
pub enum SignalingEvent {
    /// A decoded envelope, in arrival order.
    Message(SignalEnvelope),
    /// The transport reported an error; a `Closed` event follows.
    Error(String),
    /// The connection is gone for good.
    Closed(u16),
}

/// `<base>/ws/<room>?role=<ROLE>&id=<participant>`
pub fn signaling_endpoint(
    base_url: &str,
    room_id: &RoomId,
    role: Role,
    participant_id: &ParticipantId,
) -> String {
    format!(
        "{}/ws/{}?role={}&id={}",
        base_url.trim_end_matches('/'),
        room_id,
        role,
        participant_id
    )
}

/// Cloneable handle used to push envelopes onto the websocket.
#[derive(Clone)]
pub struct SignalingSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl SignalingOutput for SignalingSender {
    fn send(&self, envelope: SignalEnvelope) {
        let kind = envelope.kind();
        match envelope.encode() {
            Ok(json) => {
                if self.tx.send(Message::Text(json.into())).is_err() {
                    warn!("Signaling channel closed, dropping '{}' envelope", kind);
                }
            }
            Err(e) => error!("Failed to serialize '{}' envelope: {}", kind, e),
        }
    }

    fn close(&self) {
        let frame = CloseFrame {
            code: CloseCode::Normal,
            reason: "leave".into(),
        };
        let _ = self.tx.send(Message::Close(Some(frame)));
    }
}

pub struct SignalingChannel;

impl SignalingChannel {
    /// Opens the websocket and returns once it is ready for traffic.
    ///
    /// Inbound envelopes, errors and the final close are delivered on the
    /// returned receiver. There is no reconnect.
    pub async fn connect(
        url: &str,
    ) -> Result<
        (SignalingSender, mpsc::UnboundedReceiver<SignalingEvent>),
        tokio_tungstenite::tungstenite::Error,
    > {
        let (socket, _response) = tokio_tungstenite::connect_async(url).await?;
        info!("Signaling channel open: {}", url);

        let (mut sink, mut stream) = socket.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Message>();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut send_task = tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if let Err(e) = sink.send(msg).await {
                    warn!("Signaling write failed: {}", e);
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        let mut recv_task = tokio::spawn(async move {
            let code = loop {
                match stream.next().await {
                    Some(Ok(Message::Text(text))) => match SignalEnvelope::decode(text.as_str()) {
                        Ok(envelope) => {
                            if event_tx.send(SignalingEvent::Message(envelope)).is_err() {
                                break NORMAL_CLOSE;
                            }
                        }
                        Err(e) => warn!("Invalid signaling message: {}. Text: {}", e, text.as_str()),
                    },
                    Some(Ok(Message::Close(frame))) => {
                        break frame.map_or(ABNORMAL_CLOSE, |f| u16::from(f.code));
                    }
                    Some(Ok(other)) => debug!("Ignoring non-text signaling frame: {:?}", other),
                    Some(Err(e)) => {
                        error!("Signaling channel error: {}", e);
                        let _ = event_tx.send(SignalingEvent::Error(e.to_string()));
                        break ABNORMAL_CLOSE;
                    }
                    None => break ABNORMAL_CLOSE,
                }
            };
            let _ = event_tx.send(SignalingEvent::Closed(code));
        });

        tokio::spawn(async move {
            tokio::select! {
                _ = (&mut send_task) => {
                    // Give the peer a moment to echo our close frame.
                    let _ = tokio::time::timeout(std::time::Duration::from_secs(1), &mut recv_task).await;
                    recv_task.abort();
                }
                _ = (&mut recv_task) => send_task.abort(),
            };
            debug!("Signaling channel tasks finished");
        });

        Ok((SignalingSender { tx: out_tx }, event_rx))
    }
}
