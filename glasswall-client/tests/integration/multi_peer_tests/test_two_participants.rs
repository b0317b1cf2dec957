use glasswall_client::peer::PeerState;
use glasswall_client::{RoomSessionState, SessionPhase};
use glasswall_core::{ParticipantId, Role};

use crate::integration::{init_tracing, join_relay};
use crate::utils::{
    MemoryRelay, MockOptions, SIGNAL_TIMEOUT_MS, settle, wait_for_state, wait_until,
};

fn connected_to(id: &'static str) -> impl FnMut(&RoomSessionState) -> bool {
    move |s: &RoomSessionState| {
        s.remotes
            .get(&ParticipantId::from(id))
            .is_some_and(|r| r.peer_state == PeerState::Active && r.tracks.len() == 2)
    }
}

#[tokio::test]
async fn test_two_participants_connect_in_room() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, a_factory) = join_relay(&relay, Role::Interviewer, "a1", MockOptions::connected());
    settle().await;
    let (b, b_factory) = join_relay(&relay, Role::Candidate, "b1", MockOptions::connected());

    let a_state = wait_for_state(&a, SIGNAL_TIMEOUT_MS, connected_to("b1"))
        .await
        .expect("a1 never connected to b1");
    let b_state = wait_for_state(&b, SIGNAL_TIMEOUT_MS, connected_to("a1"))
        .await
        .expect("b1 never connected to a1");

    assert_eq!(a_state.remotes.len(), 1);
    assert_eq!(b_state.remotes.len(), 1);
    assert_eq!(
        b_state.remotes[&ParticipantId::from("a1")].label,
        "Remote User (a1)"
    );
    assert_eq!(a_state.room_id.as_str(), "r1");

    // Each side applied the candidate the other gathered.
    let a_to_b = a_factory.transport_for("b1").unwrap();
    let b_to_a = b_factory.transport_for("a1").unwrap();
    assert!(wait_until(SIGNAL_TIMEOUT_MS, || a_to_b.applied_candidates().len() == 1).await);
    assert!(wait_until(SIGNAL_TIMEOUT_MS, || b_to_a.applied_candidates().len() == 1).await);
    assert!(a_to_b.applied_candidates()[0].starts_with("candidate:answer"));
    assert!(b_to_a.applied_candidates()[0].starts_with("candidate:offer"));

    b.leave().await;
    assert_eq!(b_to_a.close_count(), 1);

    wait_for_state(&a, SIGNAL_TIMEOUT_MS, |s| s.remotes.is_empty())
        .await
        .expect("a1 did not see b1 leave");
    assert_eq!(a_to_b.close_count(), 1);
    assert_eq!(relay.member_count(), 1);

    a.leave().await;
    assert_eq!(relay.member_count(), 0);
}

#[tokio::test]
async fn test_server_drop_disconnects_participant() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, a_factory) = join_relay(&relay, Role::Interviewer, "a1", MockOptions::connected());
    settle().await;
    let (b, _) = join_relay(&relay, Role::Candidate, "b1", MockOptions::connected());
    wait_for_state(&a, SIGNAL_TIMEOUT_MS, connected_to("b1"))
        .await
        .unwrap();

    relay.drop_member("a1");

    let a_state = wait_for_state(&a, SIGNAL_TIMEOUT_MS, |s| {
        s.phase == SessionPhase::Disconnected
    })
    .await
    .unwrap();
    assert_eq!(a_state.status, "Disconnected (Code: 1006)");
    assert_eq!(a_factory.transport_for("b1").unwrap().close_count(), 1);

    wait_for_state(&b, SIGNAL_TIMEOUT_MS, |s| s.remotes.is_empty())
        .await
        .expect("b1 kept a session for the dropped participant");

    b.leave().await;
    a.leave().await;
}
