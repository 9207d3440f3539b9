//! Integration tests for the coordinator against an in-memory device
//!
//! All tests run on a paused clock, so the 30 second intervals and timeouts
//! elapse instantly while keeping their relative order.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kilight_session::memory::{MemorySession, QueryOutcome};
use kilight_session::{CancelHandle, DeviceIdentity, DeviceSession, DeviceState, OutputState, SessionError};
use kilight_state::{Coordinator, CoordinatorConfig, StateError};
use rstest::rstest;

fn device_state() -> DeviceState {
    DeviceState {
        identity: DeviceIdentity::new("KL-7F3A"),
        output_a: OutputState {
            power_on: true,
            brightness: 40,
            ..OutputState::default()
        },
        fan_speed: 1200,
        ..DeviceState::default()
    }
}

fn memory_session() -> Arc<MemorySession> {
    Arc::new(MemorySession::new("Desk", "10.0.0.2", 5000, device_state()))
}

fn count_broadcasts(coordinator: &Coordinator) -> (Arc<AtomicUsize>, CancelHandle) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let handle = coordinator.add_listener(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    (count, handle)
}

async fn ready_coordinator(session: &Arc<MemorySession>) -> Coordinator {
    let coordinator = Coordinator::new(session.clone(), CoordinatorConfig::default());
    coordinator.start_and_wait_ready().await.unwrap();
    coordinator
}

// ============================================================================
// Startup handshake
// ============================================================================

#[tokio::test(start_paused = true)]
async fn handshake_without_notification_times_out() {
    let session = memory_session();
    session.script([QueryOutcome::RespondSilently]);
    let coordinator = Coordinator::new(session.clone(), CoordinatorConfig::default());

    let started = tokio::time::Instant::now();
    let err = coordinator.start_and_wait_ready().await.unwrap_err();

    assert!(matches!(err, StateError::SetupTimeout { .. }));
    assert!(err.to_string().starts_with("Unable to communicate with \"Desk\" (10.0.0.2:5000)"));
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert!(!coordinator.is_ready());
    assert_eq!(session.callback_count(), 0);
}

#[rstest]
#[case::timeout(QueryOutcome::Stall)]
#[case::transport(QueryOutcome::Fail(SessionError::Transport("refused".into())))]
#[case::protocol(QueryOutcome::Fail(SessionError::Protocol("bad frame".into())))]
#[tokio::test(start_paused = true)]
async fn handshake_first_refresh_failure_cancels_subscription(#[case] outcome: QueryOutcome) {
    let session = memory_session();
    session.script([outcome]);
    let coordinator = Coordinator::new(session.clone(), CoordinatorConfig::default());

    let err = coordinator.start_and_wait_ready().await.unwrap_err();

    assert!(matches!(err, StateError::FirstRefreshFailed { .. }));
    assert_eq!(session.callback_count(), 0);
    assert_eq!(coordinator.run_state().consecutive_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn handshake_respects_configured_timeout() {
    let session = memory_session();
    session.script([QueryOutcome::RespondSilently]);
    let config = CoordinatorConfig::new().with_device_timeout(Duration::from_secs(5));
    let coordinator = Coordinator::new(session.clone(), config);

    let started = tokio::time::Instant::now();
    let err = coordinator.start_and_wait_ready().await.unwrap_err();

    assert!(matches!(err, StateError::SetupTimeout { waited, .. } if waited == Duration::from_secs(5)));
    assert!(started.elapsed() < Duration::from_secs(30));
}

#[tokio::test(start_paused = true)]
async fn handshake_success_keeps_only_forwarding_subscription() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;

    assert!(coordinator.is_ready());
    assert_eq!(session.callback_count(), 1);
    assert_eq!(session.state().identity.hardware_id, "KL-7F3A");
}

// ============================================================================
// Push and poll reconciliation
// ============================================================================

#[tokio::test(start_paused = true)]
async fn identical_push_still_broadcasts() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    let (count, _handle) = count_broadcasts(&coordinator);

    session.push_current();
    session.push_current();

    assert_eq!(count.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn poll_and_push_are_both_broadcast() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    coordinator.start_polling();
    let (count, _handle) = count_broadcasts(&coordinator);

    session.push_current();
    assert_eq!(count.load(Ordering::SeqCst), 1);

    tokio::time::sleep(Duration::from_secs(31)).await;

    // One forwarded session notification plus the refresh broadcast
    assert_eq!(count.load(Ordering::SeqCst), 3);
    coordinator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn poll_failure_then_success_restores_broadcasts() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    coordinator.start_polling();
    let (count, _handle) = count_broadcasts(&coordinator);

    session.script([QueryOutcome::Fail(SessionError::NetworkTimeout("no reply".into()))]);

    tokio::time::sleep(Duration::from_secs(31)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert!(coordinator.is_polling());
    assert_eq!(coordinator.run_state().consecutive_failures, 1);
    assert!(matches!(
        coordinator.run_state().last_failure,
        Some(StateError::RefreshFailed { .. })
    ));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(count.load(Ordering::SeqCst), 2);
    assert_eq!(coordinator.run_state().consecutive_failures, 0);
    assert!(coordinator.run_state().last_failure.is_none());
    assert!(!session.is_disconnected());
    coordinator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn stalled_poll_times_out_and_polling_continues() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    coordinator.start_polling();

    session.script([QueryOutcome::Stall]);
    tokio::time::sleep(Duration::from_secs(100)).await;

    // Handshake, the stalled poll and at least one poll after it
    assert!(session.query_count() >= 3);
    assert!(coordinator.run_state().last_failure.is_none());
    coordinator.shutdown();
}

#[tokio::test(start_paused = true)]
async fn polling_waits_a_full_interval_before_first_poll() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    let after_handshake = session.query_count();

    coordinator.start_polling();
    coordinator.start_polling();
    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(session.query_count(), after_handshake);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(session.query_count(), after_handshake + 1);

    coordinator.stop_polling();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(session.query_count(), after_handshake + 1);
}

#[tokio::test(start_paused = true)]
async fn late_output_b_is_propagated_as_state_change() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    let (count, _handle) = count_broadcasts(&coordinator);
    assert!(!session.state().has_output_b());

    let mut state = device_state();
    state.output_b = Some(OutputState::default());
    session.push(state);

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert!(session.state().has_output_b());
}

#[tokio::test(start_paused = true)]
async fn cancelled_listener_stops_receiving() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    let (count, handle) = count_broadcasts(&coordinator);

    session.push_current();
    assert!(handle.cancel());
    assert!(!handle.cancel());
    session.push_current();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(coordinator.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn shutdown_detaches_from_session() {
    let session = memory_session();
    let coordinator = ready_coordinator(&session).await;
    let (count, _handle) = count_broadcasts(&coordinator);

    coordinator.shutdown();
    session.push_current();

    assert_eq!(count.load(Ordering::SeqCst), 0);
    assert_eq!(session.callback_count(), 0);
}
