use glasswall_client::peer::PeerState;
use glasswall_client::{LocalMedia, RoomSession, RoomSessionState, TransportConfig};
use glasswall_core::{ParticipantId, Role};

use crate::integration::{init_tracing, test_config};
use crate::utils::{CONNECTION_TIMEOUT_MS, SIGNAL_TIMEOUT_MS, WsRelay, settle, wait_for_state};

async fn join(relay: &WsRelay, role: Role, id: &str) -> RoomSession {
    let config = test_config(role, id)
        .with_signaling_url(&relay.base_url)
        .with_transport(TransportConfig::with_ice_servers(vec![]));
    RoomSession::join(config, LocalMedia::silent(format!("{}-media", id)))
        .await
        .expect("join failed")
}

fn active_with(id: &'static str) -> impl FnMut(&RoomSessionState) -> bool {
    move |s: &RoomSessionState| {
        s.remotes
            .get(&ParticipantId::from(id))
            .is_some_and(|r| r.peer_state == PeerState::Active)
    }
}

#[tokio::test]
async fn test_webrtc_peers_connect_through_signaling_server() {
    init_tracing();

    let relay = WsRelay::start().await.expect("relay failed to start");
    let a = join(&relay, Role::Interviewer, "a1").await;
    settle().await;
    let b = join(&relay, Role::Candidate, "b1").await;

    wait_for_state(&a, SIGNAL_TIMEOUT_MS, active_with("b1"))
        .await
        .expect("a1 never finished negotiating");
    wait_for_state(&b, SIGNAL_TIMEOUT_MS, active_with("a1"))
        .await
        .expect("b1 never finished negotiating");

    wait_for_state(&a, CONNECTION_TIMEOUT_MS, |s| s.status == "Media Connected")
        .await
        .expect("a1 ICE did not connect");
    wait_for_state(&b, CONNECTION_TIMEOUT_MS, |s| s.status == "Media Connected")
        .await
        .expect("b1 ICE did not connect");

    b.leave().await;
    wait_for_state(&a, SIGNAL_TIMEOUT_MS, |s| s.remotes.is_empty())
        .await
        .expect("a1 did not see b1 leave");
    a.leave().await;
}
