use crate::transport::{
    IceState, LocalMedia, MediaTransport, RemoteTrack, SdpKind, TransportConfig, TransportEvent,
    TransportFactory,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use glasswall_core::{IceCandidate, ParticipantId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::track::track_remote::TrackRemote;

/// [`MediaTransport`] backed by a webrtc-rs peer connection.
pub struct RtcConnection {
    pub participant_id: ParticipantId,
    pub peer_connection: Arc<RTCPeerConnection>,
}

impl RtcConnection {
    pub async fn new(
        participant_id: ParticipantId,
        config: &TransportConfig,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        let uid_state = participant_id.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = state_tx.clone();
                let uid = uid_state.clone();

                Box::pin(async move {
                    info!("ICE state changed for participant {}: {}", uid, s);
                    let _ = tx
                        .send(TransportEvent::IceStateChanged(uid, IceState::from(s)))
                        .await;
                })
            },
        ));

        let ice_tx = event_tx.clone();
        let uid_ice = participant_id.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let uid = uid_ice.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                    username_fragment: init.username_fragment,
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(uid, candidate))
                    .await;
            })
        }));

        let track_tx = event_tx.clone();
        let uid_track = participant_id.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();
                let uid = uid_track.clone();

                Box::pin(async move {
                    let remote = RemoteTrack {
                        id: track.id(),
                        stream_id: track.stream_id(),
                        kind: track.kind().into(),
                    };
                    debug!(
                        "Remote {:?} track '{}' from participant {}",
                        remote.kind, remote.id, uid
                    );
                    let _ = tx.send(TransportEvent::TrackAdded(uid, remote)).await;
                })
            },
        ));

        Ok(Self {
            participant_id,
            peer_connection,
        })
    }
}

#[async_trait]
impl MediaTransport for RtcConnection {
    async fn attach_local_media(&self, media: &LocalMedia) -> Result<()> {
        for track in media.tracks() {
            self.peer_connection
                .add_track(Arc::clone(track))
                .await
                .with_context(|| format!("Failed to attach local track '{}'", track.id()))?;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    async fn set_remote_description(&self, kind: SdpKind, sdp: String) -> Result<()> {
        let desc = match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(sdp)?,
        };
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection
            .add_ice_candidate(init)
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Builds a fresh [`RtcConnection`] per remote participant.
#[derive(Clone, Default)]
pub struct RtcTransportFactory {
    config: TransportConfig,
}

impl RtcTransportFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for RtcTransportFactory {
    async fn create(
        &self,
        participant_id: ParticipantId,
        event_tx: mpsc::Sender<TransportEvent>,
    ) -> Result<Arc<dyn MediaTransport>> {
        let connection = RtcConnection::new(participant_id, &self.config, event_tx).await?;
        Ok(Arc::new(connection))
    }
}
