use std::fmt;
use std::sync::Arc;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

pub type LocalTrack = Arc<dyn TrackLocal + Send + Sync>;

/// The local camera/microphone source, already acquired by the caller.
///
/// Every peer connection attaches the same tracks; nothing in the session
/// writes to them.
#[derive(Clone, Default)]
pub struct LocalMedia {
    stream_id: String,
    tracks: Vec<LocalTrack>,
}

impl LocalMedia {
    pub fn new(stream_id: impl Into<String>, tracks: Vec<LocalTrack>) -> Self {
        Self {
            stream_id: stream_id.into(),
            tracks,
        }
    }

    /// Audio + video tracks that never carry samples.
    ///
    /// Used when no capture device is available so the remote side still
    /// negotiates both media sections.
    pub fn silent(stream_id: impl Into<String>) -> Self {
        let stream_id = stream_id.into();

        let audio = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                ..Default::default()
            },
            "audio".to_owned(),
            stream_id.clone(),
        ));
        let video = Arc::new(TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            "video".to_owned(),
            stream_id.clone(),
        ));

        Self::new(stream_id, vec![audio as LocalTrack, video as LocalTrack])
    }

    pub fn stream_id(&self) -> &str {
        &self.stream_id
    }

    pub fn tracks(&self) -> &[LocalTrack] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ids: Vec<&str> = self.tracks.iter().map(|t| t.id()).collect();
        f.debug_struct("LocalMedia")
            .field("stream_id", &self.stream_id)
            .field("tracks", &ids)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Video,
    Unknown,
}

impl From<RTPCodecType> for TrackKind {
    fn from(kind: RTPCodecType) -> Self {
        match kind {
            RTPCodecType::Audio => TrackKind::Audio,
            RTPCodecType::Video => TrackKind::Video,
            _ => TrackKind::Unknown,
        }
    }
}

/// A media track received from a remote participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: TrackKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceState {
    New,
    Checking,
    Connected,
    Completed,
    Disconnected,
    Failed,
    Closed,
}

impl IceState {
    /// States after which the transport will not come back on its own.
    pub fn is_terminal(&self) -> bool {
        matches!(self, IceState::Failed | IceState::Closed)
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, IceState::Connected | IceState::Completed)
    }

    /// Human-readable status line for this state.
    pub fn status_line(&self) -> String {
        match self {
            _ if self.is_connected() => "Media Connected".to_owned(),
            IceState::Failed | IceState::Disconnected => {
                format!("ICE Error: {} (Check firewall/ports)", self)
            }
            _ => format!("ICE: {}...", self),
        }
    }
}

impl fmt::Display for IceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IceState::New => "new",
            IceState::Checking => "checking",
            IceState::Connected => "connected",
            IceState::Completed => "completed",
            IceState::Disconnected => "disconnected",
            IceState::Failed => "failed",
            IceState::Closed => "closed",
        };
        f.write_str(name)
    }
}

impl From<RTCIceConnectionState> for IceState {
    fn from(state: RTCIceConnectionState) -> Self {
        match state {
            RTCIceConnectionState::Checking => IceState::Checking,
            RTCIceConnectionState::Connected => IceState::Connected,
            RTCIceConnectionState::Completed => IceState::Completed,
            RTCIceConnectionState::Disconnected => IceState::Disconnected,
            RTCIceConnectionState::Failed => IceState::Failed,
            RTCIceConnectionState::Closed => IceState::Closed,
            _ => IceState::New,
        }
    }
}
