use glasswall_client::SessionError;
use glasswall_core::{Role, SignalPayload};

use crate::integration::{create_test_session, init_tracing};
use crate::utils::MockOptions;

#[tokio::test]
async fn test_interviewer_toggle_applies_at_once_and_sends_one_envelope() {
    init_tracing();

    let t = create_test_session(Role::Interviewer, "a1", MockOptions::default());

    t.session.set_privacy(true).expect("interviewer may toggle");
    assert!(t.session.state().privacy_mode);

    let sent = t.signaling.sent_of_kind("privacy-toggle");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].payload, SignalPayload::PrivacyToggle { is_active: true });
    assert_eq!(sent[0].target, None);

    t.session.set_privacy(false).unwrap();
    assert!(!t.session.state().privacy_mode);

    let sent = t.signaling.sent_of_kind("privacy-toggle");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].payload, SignalPayload::PrivacyToggle { is_active: false });

    t.session.leave().await;
}

#[tokio::test]
async fn test_candidate_cannot_toggle() {
    init_tracing();

    let t = create_test_session(Role::Candidate, "b1", MockOptions::default());

    let result = t.session.set_privacy(true);
    assert!(matches!(
        result,
        Err(SessionError::NotPermitted(Role::Candidate))
    ));
    assert!(!t.session.state().privacy_mode);
    assert!(t.signaling.sent().is_empty());

    t.session.leave().await;
}
