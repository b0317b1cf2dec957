use crate::transport::{LocalMedia, SdpKind, TransportEvent};
use anyhow::Result;
use async_trait::async_trait;
use glasswall_core::{IceCandidate, ParticipantId};
use std::sync::Arc;
use tokio::sync::mpsc;

/// One direct media connection to a remote participant.
///
/// Implementations report asynchronous happenings (gathered candidates,
/// remote tracks, ICE state) through the event sender handed to
/// [`TransportFactory::create`].
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Attach the shared local tracks. Called once, before any negotiation.
    async fn attach_local_media(&self, media: &LocalMedia) -> Result<()>;

    /// Create an SDP offer and install it as the local description.
    async fn create_offer(&self) -> Result<String>;

    /// Create an SDP answer and install it as the local description.
    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        participant_id: ParticipantId,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn MediaTransport>>;
}
