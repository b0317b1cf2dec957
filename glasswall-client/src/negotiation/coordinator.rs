use crate::negotiation::NegotiationEvent;
use crate::peer::{NegotiationRole, PeerRegistry};
use crate::privacy::PrivacyBroadcaster;
use crate::room::{RemoteParticipant, StateStore};
use crate::signaling::SignalingOutput;
use crate::transport::{MediaTransport, SdpKind, TransportEvent};
use glasswall_core::{IceCandidate, ParticipantId, SignalEnvelope, SignalPayload};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Turns signaling envelopes, transport events and finished negotiation
/// steps into peer session transitions.
///
/// Owned by the room actor; every method runs on the actor task. Anything
/// that would suspend on the transport is spawned and reports back as a
/// [`NegotiationEvent`].
pub struct NegotiationCoordinator {
    local_id: ParticipantId,
    registry: PeerRegistry,
    signaling: Arc<dyn SignalingOutput>,
    privacy: PrivacyBroadcaster,
    state: StateStore,
    continuations: mpsc::UnboundedSender<NegotiationEvent>,
}

impl NegotiationCoordinator {
    pub fn new(
        local_id: ParticipantId,
        registry: PeerRegistry,
        signaling: Arc<dyn SignalingOutput>,
        privacy: PrivacyBroadcaster,
        state: StateStore,
        continuations: mpsc::UnboundedSender<NegotiationEvent>,
    ) -> Self {
        Self {
            local_id,
            registry,
            signaling,
            privacy,
            state,
            continuations,
        }
    }

    pub fn registry(&self) -> &PeerRegistry {
        &self.registry
    }

    pub async fn handle_envelope(&mut self, envelope: SignalEnvelope) {
        let SignalEnvelope {
            payload, sender, ..
        } = envelope;

        match payload {
            SignalPayload::UserJoined { id } => {
                if id == self.local_id {
                    debug!("Ignoring own user-joined notification");
                    return;
                }
                self.on_user_joined(id).await;
            }
            SignalPayload::UserLeft { id } => {
                if id == self.local_id {
                    debug!("Ignoring own user-left notification");
                    return;
                }
                info!("User {} left the room", id);
                self.remove_peer(&id).await;
            }
            SignalPayload::Offer { sdp } => {
                let Some(sender) = self.remote_sender(sender, "offer") else {
                    return;
                };
                self.on_offer(sender, sdp).await;
            }
            SignalPayload::Answer { sdp } => {
                let Some(sender) = self.remote_sender(sender, "answer") else {
                    return;
                };
                self.on_answer(sender, sdp);
            }
            SignalPayload::Candidate { candidate } => {
                let Some(sender) = self.remote_sender(sender, "candidate") else {
                    return;
                };
                match candidate {
                    Some(candidate) => self.on_candidate(sender, candidate).await,
                    None => debug!("End of candidates from {}", sender),
                }
            }
            SignalPayload::PrivacyToggle { is_active } => {
                self.privacy.on_remote_toggle(is_active);
            }
            SignalPayload::Unknown => debug!("Ignoring envelope of unknown type"),
        }
    }

    pub async fn handle_negotiation(&mut self, event: NegotiationEvent) {
        let participant = event.participant().clone();
        let generation = event.generation();

        let Some(session) = self.registry.get_mut(&participant) else {
            debug!(
                "Dropping negotiation result for {}: session is gone",
                participant
            );
            return;
        };
        if session.generation() != generation {
            debug!(
                "Dropping negotiation result for {}: round {} superseded by {}",
                participant,
                generation,
                session.generation()
            );
            return;
        }

        match event {
            NegotiationEvent::OfferCreated { result, .. } => match result {
                Ok(sdp) => {
                    if session.offer_created(generation) {
                        info!("Sending offer to {}", participant);
                        self.signaling
                            .send(SignalEnvelope::offer(participant.clone(), sdp));
                        for candidate in session.take_local_candidates() {
                            self.signaling
                                .send(SignalEnvelope::candidate(participant.clone(), candidate));
                        }
                    }
                }
                Err(e) => {
                    self.fail_peer(&participant, format!("{:#}", e)).await;
                    return;
                }
            },

            NegotiationEvent::RemoteDescriptionApplied { kind, result, .. } => {
                if let Err(e) = result {
                    self.fail_peer(&participant, format!("{:#}", e)).await;
                    return;
                }
                let Some(pending) = session.remote_description_applied(generation) else {
                    return;
                };
                debug!(
                    "Remote {:?} applied for {}, flushing {} queued candidates",
                    kind,
                    participant,
                    pending.len()
                );

                let transport = session.transport();
                for candidate in pending {
                    apply_candidate(&participant, transport.as_ref(), candidate).await;
                }

                if kind == SdpKind::Offer {
                    self.spawn_answer(participant.clone(), generation, transport);
                }
            }

            NegotiationEvent::AnswerCreated { result, .. } => match result {
                Ok(sdp) => {
                    if session.answer_created(generation) {
                        info!("Sending answer to {}", participant);
                        self.signaling
                            .send(SignalEnvelope::answer(participant.clone(), sdp));
                    }
                }
                Err(e) => {
                    self.fail_peer(&participant, format!("{:#}", e)).await;
                    return;
                }
            },
        }

        self.publish_peer_state(&participant);
    }

    pub async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(id, candidate) => {
                let Some(session) = self.registry.get_mut(&id) else {
                    debug!("Dropping local candidate for departed peer {}", id);
                    return;
                };
                if let Some(candidate) = session.local_candidate(candidate) {
                    self.signaling.send(SignalEnvelope::candidate(id, candidate));
                }
            }

            TransportEvent::TrackAdded(id, track) => {
                let Some(session) = self.registry.get_mut(&id) else {
                    debug!("Ignoring track from departed peer {}", id);
                    return;
                };
                if !session.add_remote_track(track.clone()) {
                    debug!("Track {} from {} already surfaced", track.id, id);
                    return;
                }
                info!("Remote {:?} track from {}", track.kind, id);
                self.state.update(|s| {
                    if let Some(remote) = s.remotes.get_mut(&id) {
                        remote.tracks.push(track);
                    }
                });
            }

            TransportEvent::IceStateChanged(id, ice) => {
                if !self.registry.contains(&id) {
                    return;
                }
                info!("ICE state for {}: {}", id, ice);
                self.state.update(|s| {
                    if let Some(remote) = s.remotes.get_mut(&id) {
                        remote.ice_state = Some(ice);
                    }
                    if let Some(status) = s.ice_status() {
                        s.status = status;
                    }
                });

                if ice.is_terminal() {
                    warn!("ICE {} for {}, tearing the session down", ice, id);
                    if let Some(session) = self.registry.get_mut(&id) {
                        session.fail();
                    }
                    self.remove_peer(&id).await;
                }
            }
        }
    }

    /// Closes every peer session. In-flight negotiation results are dropped
    /// when they arrive.
    pub async fn shutdown(&mut self) {
        let closed = self.registry.clear().await;
        info!("Closed {} peer sessions", closed.len());
        self.state.update(|s| s.remotes.clear());
    }

    async fn on_user_joined(&mut self, id: ParticipantId) {
        info!("User {} joined the room", id);
        if !self.ensure_session(&id, NegotiationRole::Offering).await {
            return;
        }
        let Some(session) = self.registry.get_mut(&id) else {
            return;
        };
        let Some(generation) = session.begin_offer() else {
            return;
        };
        let transport = session.transport();
        self.publish_peer_state(&id);

        let tx = self.continuations.clone();
        tokio::spawn(async move {
            let result = transport.create_offer().await;
            let _ = tx.send(NegotiationEvent::OfferCreated {
                participant: id,
                generation,
                result,
            });
        });
    }

    async fn on_offer(&mut self, sender: ParticipantId, sdp: String) {
        if !self.ensure_session(&sender, NegotiationRole::Answering).await {
            return;
        }
        let Some(session) = self.registry.get_mut(&sender) else {
            return;
        };
        let Some(generation) = session.accept_offer() else {
            return;
        };
        info!("Answering offer from {} (round {})", sender, generation);
        // An abandoned offer of ours may have left candidates behind; the
        // sender already has a session for us.
        for candidate in session.take_local_candidates() {
            self.signaling
                .send(SignalEnvelope::candidate(sender.clone(), candidate));
        }
        let transport = session.transport();
        self.publish_peer_state(&sender);
        self.spawn_remote_description(sender, generation, SdpKind::Offer, sdp, transport);
    }

    fn on_answer(&mut self, sender: ParticipantId, sdp: String) {
        let Some(session) = self.registry.get_mut(&sender) else {
            warn!("Discarding answer from {}: no peer session", sender);
            return;
        };
        let Some(generation) = session.accept_answer() else {
            return;
        };
        let transport = session.transport();
        self.spawn_remote_description(sender, generation, SdpKind::Answer, sdp, transport);
    }

    async fn on_candidate(&mut self, sender: ParticipantId, candidate: IceCandidate) {
        let Some(session) = self.registry.get_mut(&sender) else {
            warn!("Discarding ICE candidate from {}: no peer session", sender);
            return;
        };
        if let Some(candidate) = session.receive_candidate(candidate) {
            let transport = session.transport();
            apply_candidate(&sender, transport.as_ref(), candidate).await;
        }
    }

    /// `false` when the session could not be created; the failure is already
    /// reported.
    async fn ensure_session(&mut self, id: &ParticipantId, role: NegotiationRole) -> bool {
        if self.registry.contains(id) {
            return true;
        }
        match self.registry.get_or_create(id, role).await {
            Ok(_) => {
                let remote = RemoteParticipant::new(id);
                self.state.update(|s| {
                    s.remotes.insert(id.clone(), remote);
                });
                true
            }
            Err(e) => {
                error!("Could not open a transport for {}: {:#}", id, e);
                self.state
                    .set_status(format!("Negotiation Error ({}): {:#}", id.short(), e));
                false
            }
        }
    }

    fn spawn_remote_description(
        &self,
        participant: ParticipantId,
        generation: u64,
        kind: SdpKind,
        sdp: String,
        transport: Arc<dyn MediaTransport>,
    ) {
        let tx = self.continuations.clone();
        tokio::spawn(async move {
            let result = transport.set_remote_description(kind, sdp).await;
            let _ = tx.send(NegotiationEvent::RemoteDescriptionApplied {
                participant,
                generation,
                kind,
                result,
            });
        });
    }

    fn spawn_answer(
        &self,
        participant: ParticipantId,
        generation: u64,
        transport: Arc<dyn MediaTransport>,
    ) {
        let tx = self.continuations.clone();
        tokio::spawn(async move {
            let result = transport.create_answer().await;
            let _ = tx.send(NegotiationEvent::AnswerCreated {
                participant,
                generation,
                result,
            });
        });
    }

    async fn fail_peer(&mut self, id: &ParticipantId, detail: String) {
        error!("Negotiation with {} failed: {}", id, detail);
        self.state
            .set_status(format!("Negotiation Error ({}): {}", id.short(), detail));
        if let Some(session) = self.registry.get_mut(id) {
            session.fail();
        }
        self.remove_peer(id).await;
    }

    async fn remove_peer(&mut self, id: &ParticipantId) {
        if self.registry.remove(id).await.is_none() {
            debug!("No peer session for {} to remove", id);
        }
        self.state.update(|s| {
            s.remotes.remove(id);
        });
    }

    fn publish_peer_state(&self, id: &ParticipantId) {
        let Some(peer_state) = self.registry.get(id).map(|s| s.state()) else {
            return;
        };
        self.state.update(|s| {
            if let Some(remote) = s.remotes.get_mut(id) {
                remote.peer_state = peer_state;
            }
        });
    }

    fn remote_sender(&self, sender: Option<ParticipantId>, kind: &str) -> Option<ParticipantId> {
        match sender {
            Some(id) if id == self.local_id => {
                debug!("Ignoring own '{}' echoed back", kind);
                None
            }
            Some(id) => Some(id),
            None => {
                warn!("Discarding '{}' without sender", kind);
                None
            }
        }
    }
}

async fn apply_candidate(
    id: &ParticipantId,
    transport: &dyn MediaTransport,
    candidate: IceCandidate,
) {
    if let Err(e) = transport.add_ice_candidate(candidate).await {
        warn!("Failed to add ICE candidate for {}: {:?}", id, e);
    }
}
