use glasswall_client::peer::PeerState;
use glasswall_client::{RoomSession, RoomSessionState};
use glasswall_core::{ParticipantId, Role};

use crate::integration::{init_tracing, join_relay};
use crate::utils::{MemoryRelay, MockOptions, SIGNAL_TIMEOUT_MS, settle, wait_for_state};

fn connected_to_all(ids: &'static [&'static str]) -> impl FnMut(&RoomSessionState) -> bool {
    move |s: &RoomSessionState| {
        s.remotes.len() == ids.len()
            && ids.iter().all(|id| {
                s.remotes
                    .get(&ParticipantId::from(*id))
                    .is_some_and(|r| r.peer_state == PeerState::Active)
            })
    }
}

async fn expect_mesh(session: &RoomSession, ids: &'static [&'static str]) {
    wait_for_state(session, SIGNAL_TIMEOUT_MS, connected_to_all(ids))
        .await
        .unwrap_or_else(|e| panic!("{} not fully connected: {}", session.local_id(), e));
}

#[tokio::test]
async fn test_three_participants_form_full_mesh() {
    init_tracing();

    let relay = MemoryRelay::new();
    let (a, a_factory) = join_relay(&relay, Role::Interviewer, "a1", MockOptions::connected());
    settle().await;
    let (b, _) = join_relay(&relay, Role::Candidate, "b1", MockOptions::connected());
    settle().await;
    let (c, c_factory) = join_relay(&relay, Role::Candidate, "c1", MockOptions::connected());

    expect_mesh(&a, &["b1", "c1"]).await;
    expect_mesh(&b, &["a1", "c1"]).await;
    expect_mesh(&c, &["a1", "b1"]).await;

    // Exactly one transport per remote participant.
    assert_eq!(a_factory.created_count(), 2);
    assert_eq!(c_factory.created_count(), 2);

    c.leave().await;
    expect_mesh(&a, &["b1"]).await;
    expect_mesh(&b, &["a1"]).await;
    assert_eq!(a_factory.transport_for("c1").unwrap().close_count(), 1);

    a.leave().await;
    b.leave().await;
}
