use anyhow::{Context, Result};
use glasswall_client::{RoomSession, RoomSessionState};
use std::time::Duration;

/// Timeout for signaling round trips (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Timeout for real ICE connectivity (ms).
pub const CONNECTION_TIMEOUT_MS: u64 = 15000;

/// Waits until the published room state satisfies `predicate`.
pub async fn wait_for_state<F>(
    session: &RoomSession,
    timeout_ms: u64,
    predicate: F,
) -> Result<RoomSessionState>
where
    F: FnMut(&RoomSessionState) -> bool,
{
    let mut rx = session.subscribe();
    let state = tokio::time::timeout(Duration::from_millis(timeout_ms), rx.wait_for(predicate))
        .await
        .context("Timed out waiting for room state")?
        .context("Room state channel closed")?
        .clone();
    Ok(state)
}

/// Polls `condition` every 10ms until it holds or `timeout_ms` elapses.
pub async fn wait_until(timeout_ms: u64, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + Duration::from_millis(timeout_ms);
    loop {
        if condition() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Gives the session loop a moment to work through queued events.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}
