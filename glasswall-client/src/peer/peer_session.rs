use crate::peer::{NegotiationRole, PeerState};
use crate::transport::{MediaTransport, RemoteTrack};
use glasswall_core::{IceCandidate, ParticipantId};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, warn};

/// Negotiation state for one remote participant.
///
/// The session never awaits on its own; it only decides whether an event is
/// valid for its current state. Every asynchronous step is tagged with the
/// `generation` that was current when it started, so a result that arrives
/// after a newer round began (or after teardown) is recognised as stale.
pub struct PeerSession {
    participant_id: ParticipantId,
    transport: Arc<dyn MediaTransport>,
    state: PeerState,
    role: NegotiationRole,
    generation: u64,
    offer_sent: bool,
    awaiting_answer: bool,
    has_remote_description: bool,
    pending_candidates: VecDeque<IceCandidate>,
    outbound_candidates: VecDeque<IceCandidate>,
    remote_tracks: Vec<RemoteTrack>,
}

impl PeerSession {
    pub fn new(
        participant_id: ParticipantId,
        role: NegotiationRole,
        transport: Arc<dyn MediaTransport>,
    ) -> Self {
        Self {
            participant_id,
            transport,
            state: PeerState::Idle,
            role,
            generation: 0,
            offer_sent: false,
            awaiting_answer: false,
            has_remote_description: false,
            pending_candidates: VecDeque::new(),
            outbound_candidates: VecDeque::new(),
            remote_tracks: Vec::new(),
        }
    }

    pub fn participant_id(&self) -> &ParticipantId {
        &self.participant_id
    }

    pub fn state(&self) -> PeerState {
        self.state
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn transport(&self) -> Arc<dyn MediaTransport> {
        Arc::clone(&self.transport)
    }

    pub fn has_remote_description(&self) -> bool {
        self.has_remote_description
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    pub fn remote_tracks(&self) -> &[RemoteTrack] {
        &self.remote_tracks
    }

    /// IDLE -> NEGOTIATING(offering). Returns the generation of the new round.
    pub fn begin_offer(&mut self) -> Option<u64> {
        if self.state != PeerState::Idle {
            debug!(
                "Not offering to {}: session is {}",
                self.participant_id, self.state
            );
            return None;
        }
        Some(self.start_round(NegotiationRole::Offering))
    }

    /// The local offer of round `generation` is ready to be sent.
    pub fn offer_created(&mut self, generation: u64) -> bool {
        if !self.is_current(generation, NegotiationRole::Offering) || self.awaiting_answer {
            return false;
        }
        self.offer_sent = true;
        self.awaiting_answer = true;
        true
    }

    /// An answer arrived. Only valid while our offer is outstanding.
    pub fn accept_answer(&mut self) -> Option<u64> {
        if self.state != PeerState::Negotiating(NegotiationRole::Offering) || !self.awaiting_answer
        {
            warn!(
                "Discarding stale answer from {} (session is {})",
                self.participant_id, self.state
            );
            return None;
        }
        self.awaiting_answer = false;
        Some(self.generation)
    }

    /// An offer arrived: initial connection or renegotiation.
    ///
    /// Accepted from any live state; any offer of ours still in flight is
    /// abandoned. Remote tracks already surfaced are kept.
    pub fn accept_offer(&mut self) -> Option<u64> {
        if self.state.is_shutting_down() {
            warn!(
                "Discarding offer from {}: session is {}",
                self.participant_id, self.state
            );
            return None;
        }
        Some(self.start_round(NegotiationRole::Answering))
    }

    /// The remote description of round `generation` is installed.
    ///
    /// Returns the candidates that were held back, in arrival order, or
    /// `None` when the result belongs to an abandoned round.
    pub fn remote_description_applied(&mut self, generation: u64) -> Option<Vec<IceCandidate>> {
        let PeerState::Negotiating(role) = self.state else {
            return None;
        };
        if generation != self.generation {
            return None;
        }

        self.has_remote_description = true;
        if role == NegotiationRole::Offering {
            self.state = PeerState::Active;
        }
        Some(self.pending_candidates.drain(..).collect())
    }

    /// The local answer of round `generation` is ready to be sent.
    pub fn answer_created(&mut self, generation: u64) -> bool {
        if !self.is_current(generation, NegotiationRole::Answering) || !self.has_remote_description
        {
            return false;
        }
        self.state = PeerState::Active;
        true
    }

    /// Returns the candidate back when it may be applied right away.
    pub fn receive_candidate(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        if self.state.is_shutting_down() {
            return None;
        }
        if self.has_remote_description {
            return Some(candidate);
        }
        debug!(
            "Queueing ICE candidate from {} until remote description is set",
            self.participant_id
        );
        self.pending_candidates.push_back(candidate);
        None
    }

    /// A candidate gathered by our transport. Returns it back when it may be
    /// sent right away.
    ///
    /// While our offer is still being created the remote has no session to
    /// put candidates in, so they are held until [`Self::take_local_candidates`].
    pub fn local_candidate(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        if self.state.is_shutting_down() {
            return None;
        }
        if self.state == PeerState::Negotiating(NegotiationRole::Offering) && !self.offer_sent {
            debug!(
                "Holding local ICE candidate for {} until the offer is sent",
                self.participant_id
            );
            self.outbound_candidates.push_back(candidate);
            return None;
        }
        Some(candidate)
    }

    /// Drains held local candidates, in gathering order.
    pub fn take_local_candidates(&mut self) -> Vec<IceCandidate> {
        self.outbound_candidates.drain(..).collect()
    }

    pub fn held_local_candidates(&self) -> usize {
        self.outbound_candidates.len()
    }

    /// Records a remote track; `false` if it was already known.
    pub fn add_remote_track(&mut self, track: RemoteTrack) -> bool {
        if self.remote_tracks.iter().any(|t| t.id == track.id) {
            return false;
        }
        self.remote_tracks.push(track);
        true
    }

    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = PeerState::Failed;
        }
        self.awaiting_answer = false;
        self.pending_candidates.clear();
        self.outbound_candidates.clear();
    }

    /// Close the transport. A failed session stays `Failed`.
    pub async fn close(&mut self) {
        if self.state == PeerState::Closed {
            return;
        }
        let failed = self.state == PeerState::Failed;
        if !failed {
            self.state = PeerState::Closing;
        }
        self.pending_candidates.clear();
        self.outbound_candidates.clear();

        if let Err(e) = self.transport.close().await {
            warn!(
                "Failed to close transport for {}: {:?}",
                self.participant_id, e
            );
        }

        if !failed {
            self.state = PeerState::Closed;
        }
    }

    fn start_round(&mut self, role: NegotiationRole) -> u64 {
        self.generation += 1;
        self.role = role;
        self.state = PeerState::Negotiating(role);
        self.offer_sent = false;
        self.awaiting_answer = false;
        self.generation
    }

    fn is_current(&self, generation: u64, role: NegotiationRole) -> bool {
        generation == self.generation && self.state == PeerState::Negotiating(role)
    }
}
