use crate::transport::{IceState, RemoteTrack};
use glasswall_core::{IceCandidate, ParticipantId};

/// Events a peer transport raises for the room session loop.
#[derive(Debug)]
pub enum TransportEvent {
    /// A local ICE candidate was gathered and has to reach the remote peer.
    CandidateGenerated(ParticipantId, IceCandidate),

    /// The remote peer started sending a media track.
    TrackAdded(ParticipantId, RemoteTrack),

    /// ICE connectivity changed.
    IceStateChanged(ParticipantId, IceState),
}
