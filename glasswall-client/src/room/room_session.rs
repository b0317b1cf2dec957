use crate::negotiation::{NegotiationCoordinator, NegotiationEvent};
use crate::peer::PeerRegistry;
use crate::privacy::PrivacyBroadcaster;
use crate::room::{
    RoomCommand, RoomSessionState, SessionConfig, SessionError, SessionPhase, StateStore,
};
use crate::signaling::{
    ABNORMAL_CLOSE, NORMAL_CLOSE, SignalingChannel, SignalingEvent, SignalingOutput,
};
use crate::transport::{LocalMedia, RtcTransportFactory, TransportEvent, TransportFactory};
use glasswall_core::{ParticipantId, Role};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Handle to a joined room.
///
/// All peer sessions live on a dedicated actor task; the handle only reads
/// the published [`RoomSessionState`] and sends commands.
pub struct RoomSession {
    local_id: ParticipantId,
    role: Role,
    state: StateStore,
    privacy: PrivacyBroadcaster,
    command_tx: mpsc::Sender<RoomCommand>,
    task: JoinHandle<()>,
}

impl RoomSession {
    /// Connects to the signaling server and starts the session with real
    /// WebRTC transports.
    pub async fn join(
        config: SessionConfig,
        local_media: LocalMedia,
    ) -> Result<Self, SessionError> {
        let url = config.endpoint();
        info!("Joining room {} as {}", config.room_id, config.role);

        let (sender, events) = SignalingChannel::connect(&url).await?;
        let factory = Arc::new(RtcTransportFactory::new(config.transport.clone()));

        Ok(Self::join_with(
            config,
            local_media,
            Arc::new(sender),
            events,
            factory,
        ))
    }

    /// Starts the session over an already open signaling channel.
    pub fn join_with(
        config: SessionConfig,
        local_media: LocalMedia,
        signaling: Arc<dyn SignalingOutput>,
        signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
        factory: Arc<dyn TransportFactory>,
    ) -> Self {
        let mut initial = RoomSessionState::new(
            config.room_id.clone(),
            config.role,
            config.participant_id.clone(),
            local_media.clone(),
        );
        initial.status = "Connected to Signaling Server".to_owned();
        initial.phase = SessionPhase::Connected;

        let state = StateStore::new(initial);
        let privacy = PrivacyBroadcaster::new(state.clone(), signaling.clone());

        let (command_tx, command_rx) = mpsc::channel(16);
        let (transport_tx, transport_rx) = mpsc::channel(256);
        let (negotiation_tx, negotiation_rx) = mpsc::unbounded_channel();

        let registry = PeerRegistry::new(factory, local_media, transport_tx);
        let coordinator = NegotiationCoordinator::new(
            config.participant_id.clone(),
            registry,
            signaling.clone(),
            privacy.clone(),
            state.clone(),
            negotiation_tx,
        );

        let actor = RoomActor {
            coordinator,
            signaling,
            state: state.clone(),
            command_rx,
            signaling_rx,
            transport_rx,
            negotiation_rx,
        };
        let task = tokio::spawn(actor.run());

        Self {
            local_id: config.participant_id,
            role: config.role,
            state,
            privacy,
            command_tx,
            task,
        }
    }

    pub fn local_id(&self) -> &ParticipantId {
        &self.local_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> RoomSessionState {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoomSessionState> {
        self.state.subscribe()
    }

    /// Switches privacy mode for the whole room. Interviewers only.
    ///
    /// The local state reflects the new value before this returns.
    pub fn set_privacy(&self, is_active: bool) -> Result<(), SessionError> {
        if !self.role.can_toggle_privacy() {
            return Err(SessionError::NotPermitted(self.role));
        }
        if self.is_closed() {
            return Err(SessionError::Closed);
        }
        self.privacy.toggle(is_active);
        Ok(())
    }

    /// `true` once the session loop has stopped, by `leave` or because the
    /// signaling channel went away.
    pub fn is_closed(&self) -> bool {
        self.command_tx.is_closed()
    }

    /// Closes every peer transport and the signaling channel, and waits for
    /// the session loop to finish.
    pub async fn leave(self) {
        if self.command_tx.send(RoomCommand::Leave).await.is_err() {
            info!("Room session already finished");
        }
        if let Err(e) = self.task.await {
            error!("Room session task failed: {}", e);
        }
    }
}

struct RoomActor {
    coordinator: NegotiationCoordinator,
    signaling: Arc<dyn SignalingOutput>,
    state: StateStore,
    command_rx: mpsc::Receiver<RoomCommand>,
    signaling_rx: mpsc::UnboundedReceiver<SignalingEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    negotiation_rx: mpsc::UnboundedReceiver<NegotiationEvent>,
}

impl RoomActor {
    async fn run(mut self) {
        info!("Room session loop started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(RoomCommand::Leave) => {
                            self.leave().await;
                            break;
                        }
                        None => {
                            info!("Room session handle dropped. Leaving.");
                            self.leave().await;
                            break;
                        }
                    }
                }

                evt = self.signaling_rx.recv() => {
                    match evt {
                        Some(SignalingEvent::Message(envelope)) => {
                            self.coordinator.handle_envelope(envelope).await;
                        }
                        Some(SignalingEvent::Error(detail)) => {
                            warn!("Signaling error: {}", detail);
                            self.state.set_status(format!("Connection Error: {}", detail));
                        }
                        Some(SignalingEvent::Closed(code)) => {
                            self.disconnected(code).await;
                            break;
                        }
                        None => {
                            warn!("Signaling channel dropped without a close event");
                            self.disconnected(ABNORMAL_CLOSE).await;
                            break;
                        }
                    }
                }

                Some(evt) = self.transport_rx.recv() => {
                    self.coordinator.handle_transport_event(evt).await;
                }

                Some(evt) = self.negotiation_rx.recv() => {
                    self.coordinator.handle_negotiation(evt).await;
                }
            }
        }

        info!("Room session loop finished");
    }

    async fn leave(&mut self) {
        self.coordinator.shutdown().await;
        self.signaling.close();
        self.state.update(|s| {
            s.phase = SessionPhase::Left;
            s.status = "Left Room".to_owned();
        });
        info!("Left room");
    }

    async fn disconnected(&mut self, code: u16) {
        info!("Signaling channel closed with code {}", code);
        self.coordinator.shutdown().await;
        let status = if code == NORMAL_CLOSE {
            "Disconnected".to_owned()
        } else {
            format!("Disconnected (Code: {})", code)
        };
        self.state.update(|s| {
            s.phase = SessionPhase::Disconnected;
            s.status = status;
        });
    }
}
