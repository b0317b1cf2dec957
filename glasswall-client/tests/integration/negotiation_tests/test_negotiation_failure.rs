use glasswall_client::peer::PeerState;
use glasswall_core::{ParticipantId, Role, SignalEnvelope};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::{MockOptions, SIGNAL_TIMEOUT_MS, wait_for_state};

#[tokio::test]
async fn test_failed_negotiation_tears_down_only_that_peer() {
    init_tracing();

    let options = MockOptions {
        reject_remote_from: vec!["b1".into()],
        ..Default::default()
    };
    let t = create_test_session(Role::Candidate, "a1", options);

    t.deliver_from("c1", SignalEnvelope::offer("a1".into(), "offer-c".into()));
    wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.remotes
            .get(&ParticipantId::from("c1"))
            .is_some_and(|r| r.peer_state == PeerState::Active)
    })
    .await
    .expect("c1 did not connect");

    t.deliver_from("b1", SignalEnvelope::offer("a1".into(), "offer-b".into()));
    let state = wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.status.starts_with("Negotiation Error (b1)")
    })
    .await
    .expect("failure was not reported");

    assert!(!state.remotes.contains_key(&ParticipantId::from("b1")));
    assert_eq!(
        state.remotes[&ParticipantId::from("c1")].peer_state,
        PeerState::Active
    );
    assert_eq!(state.status, "Negotiation Error (b1): remote description rejected");

    let failed = t.factory.transport_for("b1").unwrap();
    assert_eq!(failed.close_count(), 1);
    let answers = t.signaling.sent_of_kind("answer");
    assert_eq!(answers.len(), 1);
    assert_eq!(answers[0].target, Some(ParticipantId::from("c1")));

    t.session.leave().await;
    assert_eq!(failed.close_count(), 1);
}

#[tokio::test]
async fn test_transport_creation_failure_is_reported() {
    init_tracing();

    let options = MockOptions {
        fail_create: true,
        ..Default::default()
    };
    let t = create_test_session(Role::Interviewer, "a1", options);
    t.deliver(SignalEnvelope::user_joined("b1".into()));

    let state = wait_for_state(&t.session, SIGNAL_TIMEOUT_MS, |s| {
        s.status.starts_with("Negotiation Error (b1)")
    })
    .await
    .expect("failure was not reported");
    assert!(state.remotes.is_empty());
    assert!(t.signaling.sent().is_empty());

    t.session.leave().await;
}
