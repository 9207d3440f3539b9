//! Device-state synchronization coordinator
//!
//! The [`Coordinator`] reconciles two sources of truth for one device: state
//! queried on a fixed cadence and state pushed by the device at any time.
//! Both end up as the same "state changed" broadcast to coordinator
//! listeners, so consumers never see where an update came from.
//!
//! # Lifecycle
//!
//! ```text
//! new() ──> start_and_wait_ready() ──> start_polling() ──> shutdown()
//!              │  first fetch (bounded)
//!              │  wait for first notification (bounded)
//!              └─ attach forwarding: session callbacks ──> listeners
//! ```
//!
//! Every successful refresh broadcasts, even when nothing changed, and every
//! session notification is forwarded as it arrives. Nothing is coalesced, so a
//! poll and a push that race produce two broadcasts in arrival order.
//!
//! # Example
//!
//! ```rust,ignore
//! let coordinator = Coordinator::new(session, CoordinatorConfig::default());
//! coordinator.start_and_wait_ready().await?;
//! coordinator.start_polling();
//!
//! let handle = coordinator.add_listener(|| println!("state changed"));
//! // ...
//! handle.cancel();
//! coordinator.shutdown();
//! ```

use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::{DateTime, Utc};
use kilight_session::{CancelHandle, DeviceSession, SessionError, Subscribers};
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::CoordinatorConfig;
use crate::error::{Result, StateError};

/// Diagnostics snapshot of a coordinator
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    /// Whether the startup handshake has completed
    pub ready: bool,
    /// Whether the background poll task is running
    pub polling: bool,
    /// When the last refresh succeeded
    pub last_success: Option<DateTime<Utc>>,
    /// Most recent failure, cleared by the next success
    pub last_failure: Option<StateError>,
    /// Failures since the last success
    pub consecutive_failures: u32,
    pub poll_interval: Duration,
    pub device_timeout: Duration,
}

impl RunState {
    fn new(config: &CoordinatorConfig) -> Self {
        Self {
            ready: false,
            polling: false,
            last_success: None,
            last_failure: None,
            consecutive_failures: 0,
            poll_interval: config.poll_interval,
            device_timeout: config.device_timeout,
        }
    }
}

/// Keeps host-visible state of one device in sync with the hardware
///
/// Cheap to clone; clones share the same session, listeners and poll task.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    session: Arc<dyn DeviceSession>,
    config: CoordinatorConfig,
    listeners: Subscribers,
    forwarding: Mutex<Option<CancelHandle>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
    run_state: Mutex<RunState>,
}

impl Coordinator {
    pub fn new(session: Arc<dyn DeviceSession>, config: CoordinatorConfig) -> Self {
        let run_state = RunState::new(&config);
        Self {
            inner: Arc::new(CoordinatorInner {
                session,
                config,
                listeners: Subscribers::new(),
                forwarding: Mutex::new(None),
                poll_task: Mutex::new(None),
                run_state: Mutex::new(run_state),
            }),
        }
    }

    /// Session this coordinator drives
    pub fn session(&self) -> &Arc<dyn DeviceSession> {
        &self.inner.session
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Perform the startup handshake
    ///
    /// Registers a transient subscription, fetches state once and then waits
    /// for the first state-change notification. Both the fetch and the wait
    /// are bounded by the device timeout. The transient subscription is
    /// cancelled on every exit path. On success the coordinator starts
    /// forwarding session notifications to its listeners.
    pub async fn start_and_wait_ready(&self) -> Result<()> {
        let inner = &self.inner;
        let device_timeout = inner.config.device_timeout;

        let first_notification = Arc::new(Notify::new());
        let signal = Arc::clone(&first_notification);
        let handshake = inner
            .session
            .register_callback(Box::new(move || signal.notify_one()))
            .into_guard();

        debug!(device = %inner.session.name(), address = %inner.session.address(), "Starting handshake");

        if let Err(source) = inner.query().await {
            let err = StateError::FirstRefreshFailed {
                name: inner.session.name(),
                address: inner.session.address(),
                source,
            };
            inner.record_failure(&err);
            return Err(err);
        }

        if timeout(device_timeout, first_notification.notified()).await.is_err() {
            let err = StateError::SetupTimeout {
                name: inner.session.name(),
                address: inner.session.address(),
                waited: device_timeout,
            };
            inner.record_failure(&err);
            return Err(err);
        }

        drop(handshake);
        inner.attach_forwarding();
        {
            let mut run_state = inner.run_state.lock();
            run_state.ready = true;
        }
        inner.record_success();
        inner.listeners.notify();

        info!(device = %inner.session.name(), "Device ready");
        Ok(())
    }

    /// Query the device once and broadcast to listeners on success
    ///
    /// Failures are wrapped as [`StateError::RefreshFailed`] and recorded in
    /// the run state; the session is left as it is.
    pub async fn refresh(&self) -> Result<()> {
        self.inner.refresh().await
    }

    /// Start the background poll task
    ///
    /// The first poll happens one interval from now. Missed ticks are delayed
    /// rather than bunched up. Calling this while polling is a no-op.
    pub fn start_polling(&self) {
        let mut slot = self.inner.poll_task.lock();
        if slot.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let weak = Arc::downgrade(&self.inner);
        let period = self.inner.config.poll_interval;
        *slot = Some(tokio::spawn(poll_loop(weak, period)));
        self.inner.run_state.lock().polling = true;

        debug!(device = %self.inner.session.name(), interval = ?period, "Polling started");
    }

    /// Stop the background poll task; no-op when not polling
    pub fn stop_polling(&self) {
        self.inner.stop_polling();
    }

    pub fn is_polling(&self) -> bool {
        self.inner
            .poll_task
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.run_state.lock().ready
    }

    /// Subscribe to state-changed broadcasts
    pub fn add_listener<F>(&self, callback: F) -> CancelHandle
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner.listeners.register(callback)
    }

    /// Number of live listener registrations
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.len()
    }

    /// Stop polling and detach from the session; idempotent
    pub fn shutdown(&self) {
        self.inner.stop_polling();
        self.inner.detach_forwarding();
        self.inner.run_state.lock().ready = false;
    }

    pub fn run_state(&self) -> RunState {
        self.inner.run_state.lock().clone()
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("device", &self.inner.session.name())
            .field("address", &self.inner.session.address())
            .field("listeners", &self.inner.listeners.len())
            .finish()
    }
}

async fn poll_loop(inner: Weak<CoordinatorInner>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;

        let Some(inner) = inner.upgrade() else {
            break;
        };

        if let Err(err) = inner.refresh().await {
            warn!(error = %err, "Poll failed, retrying next interval");
        }
    }
}

impl CoordinatorInner {
    /// One bounded state query
    async fn query(&self) -> std::result::Result<(), SessionError> {
        match timeout(self.config.device_timeout, self.session.update_state()).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::NetworkTimeout(format!(
                "no reply within {:?}",
                self.config.device_timeout
            ))),
        }
    }

    async fn refresh(&self) -> Result<()> {
        debug!(device = %self.session.name(), "Refreshing device state");

        match self.query().await {
            Ok(()) => {
                self.record_success();
                self.listeners.notify();
                Ok(())
            }
            Err(source) => {
                let err = StateError::RefreshFailed {
                    name: self.session.name(),
                    address: self.session.address(),
                    source,
                };
                self.record_failure(&err);
                Err(err)
            }
        }
    }

    fn attach_forwarding(&self) {
        let mut forwarding = self.forwarding.lock();
        if forwarding.is_some() {
            return;
        }

        let listeners = self.listeners.clone();
        *forwarding = Some(self.session.register_callback(Box::new(move || {
            listeners.notify();
        })));
    }

    fn detach_forwarding(&self) {
        if let Some(handle) = self.forwarding.lock().take() {
            handle.cancel();
        }
    }

    fn stop_polling(&self) {
        if let Some(task) = self.poll_task.lock().take() {
            task.abort();
            debug!(device = %self.session.name(), "Polling stopped");
        }
        self.run_state.lock().polling = false;
    }

    fn record_success(&self) {
        let mut run_state = self.run_state.lock();
        if run_state.consecutive_failures > 0 {
            info!(
                device = %self.session.name(),
                failures = run_state.consecutive_failures,
                "Device communication recovered"
            );
        }
        run_state.last_success = Some(Utc::now());
        run_state.last_failure = None;
        run_state.consecutive_failures = 0;
    }

    fn record_failure(&self, err: &StateError) {
        let mut run_state = self.run_state.lock();
        run_state.last_failure = Some(err.clone());
        run_state.consecutive_failures += 1;
    }
}

impl Drop for CoordinatorInner {
    fn drop(&mut self) {
        if let Some(task) = self.poll_task.get_mut().take() {
            task.abort();
        }
        if let Some(handle) = self.forwarding.get_mut().take() {
            handle.cancel();
        }
    }
}
