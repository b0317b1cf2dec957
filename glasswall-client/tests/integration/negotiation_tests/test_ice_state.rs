use glasswall_client::peer::PeerState;
use glasswall_client::transport::{IceState, TransportEvent};
use glasswall_core::{ParticipantId, Role, SignalEnvelope};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{MockOptions, SIGNAL_TIMEOUT_MS, wait_for_state};

#[tokio::test]
async fn test_ice_states_drive_status_and_teardown() {
    init_tracing();

    let t = create_test_session(Role::Candidate, "a1", MockOptions::default());
    t.deliver_from("b1", SignalEnvelope::offer("a1".into(), "remote-offer".into()));
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.remotes
            .get(&ParticipantId::from("b1"))
            .is_some_and(|r| r.peer_state == PeerState::Active)
    })
    .await
    .unwrap();

    let transport = t.factory.transport_for("b1").unwrap();
    let b1 = ParticipantId::from("b1");

    transport
        .emit(TransportEvent::IceStateChanged(b1.clone(), IceState::Checking))
        .await;
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| s.status == "ICE: checking...")
        .await
        .unwrap();

    transport
        .emit(TransportEvent::IceStateChanged(b1.clone(), IceState::Connected))
        .await;
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| s.status == "Media Connected")
        .await
        .unwrap();

    // Disconnected may recover: status only.
    transport
        .emit(TransportEvent::IceStateChanged(
            b1.clone(),
            IceState::Disconnected,
        ))
        .await;
    let state = wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.status == "ICE Error: disconnected (Check firewall/ports)"
    })
    .await
    .unwrap();
    assert!(state.remotes.contains_key(&b1));
    assert_eq!(transport.close_count(), 0);

    transport
        .emit(TransportEvent::IceStateChanged(b1.clone(), IceState::Failed))
        .await;
    let state = wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| s.remotes.is_empty())
        .await
        .unwrap();
    assert_eq!(state.status, "ICE Error: failed (Check firewall/ports)");
    assert_eq!(transport.close_count(), 1);

    t.session.leave().await;
    assert_eq!(transport.close_count(), 1);
}

#[tokio::test]
async fn test_status_reflects_least_connected_peer() {
    init_tracing();

    let t = create_test_session(Role::Interviewer, "a1", MockOptions::default());
    for id in ["b1", "c1"] {
        t.deliver_from(id, SignalEnvelope::offer("a1".into(), "remote-offer".into()));
    }
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.remotes.len() == 2 && s.remotes.values().all(|r| r.peer_state == PeerState::Active)
    })
    .await
    .unwrap();

    let b1 = ParticipantId::from("b1");
    let c1 = ParticipantId::from("c1");
    let to_b = t.factory.transport_for("b1").unwrap();
    let to_c = t.factory.transport_for("c1").unwrap();

    to_b.emit(TransportEvent::IceStateChanged(b1.clone(), IceState::Connected))
        .await;
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| s.status == "Media Connected")
        .await
        .unwrap();

    // A second peer still checking must not be hidden by the first one.
    to_c.emit(TransportEvent::IceStateChanged(c1.clone(), IceState::Checking))
        .await;
    let state = wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| s.status == "ICE: checking...")
        .await
        .unwrap();
    assert_eq!(state.remotes[&b1].ice_state, Some(IceState::Connected));

    // Nor may a later update from the connected peer hide it.
    to_b.emit(TransportEvent::IceStateChanged(b1.clone(), IceState::Completed))
        .await;
    let state = wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.remotes[&b1].ice_state == Some(IceState::Completed)
    })
    .await
    .unwrap();
    assert_eq!(state.status, "ICE: checking...");

    to_c.emit(TransportEvent::IceStateChanged(c1.clone(), IceState::Connected))
        .await;
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| s.status == "Media Connected")
        .await
        .unwrap();

    t.session.leave().await;
}
