//! In-memory device session for tests and simulators
//!
//! [`MemorySession`] behaves like a connected KiLight without any network:
//! queries copy the simulated device state into the snapshot and notify
//! subscribers, pushes do the same out-of-band, and writes are recorded.
//! Query outcomes can be scripted to fail, stall forever or succeed without
//! notifying anyone.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};

use crate::error::{Result, SessionError};
use crate::model::{DeviceState, OutputId};
use crate::session::{Connector, DeviceSession, OutputWrite};
use crate::subscription::{CancelHandle, Subscribers};

/// What the next `update_state()` call does
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Replace the snapshot with the device state and notify subscribers
    Respond,
    /// Replace the snapshot without notifying anyone
    RespondSilently,
    /// Fail with the given error
    Fail(SessionError),
    /// Never complete
    Stall,
}

/// Scriptable in-memory session
pub struct MemorySession {
    name: String,
    host: String,
    port: u16,
    snapshot: RwLock<Arc<DeviceState>>,
    device: Mutex<DeviceState>,
    subscribers: Subscribers,
    script: Mutex<VecDeque<QueryOutcome>>,
    fallback: Mutex<QueryOutcome>,
    write_error: Mutex<Option<SessionError>>,
    writes: Mutex<Vec<(OutputId, OutputWrite)>>,
    queries: AtomicUsize,
    disconnects: AtomicUsize,
    disconnected: AtomicBool,
}

impl MemorySession {
    /// Session whose device reports `device` once queried
    ///
    /// The snapshot starts out empty, like a real session before its first
    /// fetch.
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16, device: DeviceState) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            snapshot: RwLock::new(Arc::new(DeviceState::default())),
            device: Mutex::new(device),
            subscribers: Subscribers::new(),
            script: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(QueryOutcome::Respond),
            write_error: Mutex::new(None),
            writes: Mutex::new(Vec::new()),
            queries: AtomicUsize::new(0),
            disconnects: AtomicUsize::new(0),
            disconnected: AtomicBool::new(false),
        }
    }

    /// Session for an address nobody answers on
    pub fn unreachable(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let session = Self::new(host.clone(), host.clone(), port, DeviceState::default());
        session.set_fallback(QueryOutcome::Fail(SessionError::Transport(format!(
            "connection to {}:{} refused",
            host, port
        ))));
        session
    }

    /// Queue outcomes for the next queries, consumed in order
    pub fn script(&self, outcomes: impl IntoIterator<Item = QueryOutcome>) {
        self.script.lock().extend(outcomes);
    }

    /// Outcome used once the script is exhausted
    pub fn set_fallback(&self, outcome: QueryOutcome) {
        *self.fallback.lock() = outcome;
    }

    /// Make every subsequent write fail with `error` (`None` to clear)
    pub fn fail_writes(&self, error: Option<SessionError>) {
        *self.write_error.lock() = error;
    }

    /// Change what the device will report on the next query
    pub fn set_device_state(&self, state: DeviceState) {
        *self.device.lock() = state;
    }

    /// Simulate an unsolicited push from the device
    pub fn push(&self, state: DeviceState) {
        *self.device.lock() = state.clone();
        *self.snapshot.write() = Arc::new(state);
        self.subscribers.notify();
    }

    /// Re-deliver the current device state as a push
    pub fn push_current(&self) {
        let state = self.device.lock().clone();
        self.push(state);
    }

    /// Writes received so far, oldest first
    pub fn writes(&self) -> Vec<(OutputId, OutputWrite)> {
        self.writes.lock().clone()
    }

    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Number of `disconnect()` calls, including repeated ones
    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::SeqCst)
    }

    /// Live callback registrations
    pub fn callback_count(&self) -> usize {
        self.subscribers.len()
    }

    fn next_outcome(&self) -> QueryOutcome {
        match self.script.lock().pop_front() {
            Some(outcome) => outcome,
            None => self.fallback.lock().clone(),
        }
    }

    fn apply(&self, write: &OutputWrite, output: OutputId) {
        let mut device = self.device.lock();
        if let Some(state) = device.output_mut(output) {
            if let Some(on) = write.power_on {
                state.power_on = on;
            }
            if let Some(brightness) = write.brightness {
                state.brightness = brightness;
            }
            if let Some(color) = write.rgbcw {
                state.rgbcw = color;
            }
            if let Some(kelvin) = write.color_temp {
                state.color_temp = kelvin;
            }
        }
    }
}

#[async_trait]
impl DeviceSession for MemorySession {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn host(&self) -> &str {
        &self.host
    }

    fn port(&self) -> u16 {
        self.port
    }

    fn state(&self) -> Arc<DeviceState> {
        self.snapshot.read().clone()
    }

    async fn update_state(&self) -> Result<()> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        if self.is_disconnected() {
            return Err(SessionError::Disconnected);
        }

        match self.next_outcome() {
            QueryOutcome::Respond => {
                let state = self.device.lock().clone();
                *self.snapshot.write() = Arc::new(state);
                self.subscribers.notify();
                Ok(())
            }
            QueryOutcome::RespondSilently => {
                let state = self.device.lock().clone();
                *self.snapshot.write() = Arc::new(state);
                Ok(())
            }
            QueryOutcome::Fail(err) => Err(err),
            QueryOutcome::Stall => std::future::pending().await,
        }
    }

    async fn write_output(&self, output: OutputId, write: OutputWrite) -> Result<()> {
        if self.is_disconnected() {
            return Err(SessionError::Disconnected);
        }
        if let Some(err) = self.write_error.lock().clone() {
            return Err(err);
        }

        self.apply(&write, output);
        self.writes.lock().push((output, write));
        Ok(())
    }

    fn register_callback(&self, callback: Box<dyn Fn() + Send + Sync>) -> CancelHandle {
        self.subscribers.register(callback)
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        if !self.disconnected.swap(true, Ordering::SeqCst) {
            tracing::debug!(name = %self.name, "Memory session disconnected");
        }
    }
}

/// Connector handing out pre-registered [`MemorySession`]s
///
/// Addresses without a registered session get a fresh
/// [`MemorySession::unreachable`].
#[derive(Default)]
pub struct MemoryConnector {
    sessions: Mutex<HashMap<String, Arc<MemorySession>>>,
    opened: Mutex<Vec<String>>,
}

impl MemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `session` the one returned for its own address
    pub fn insert(&self, session: Arc<MemorySession>) {
        let key = session.address();
        self.sessions.lock().insert(key, session);
    }

    /// Addresses opened so far, oldest first
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().clone()
    }
}

impl Connector for MemoryConnector {
    fn open(&self, host: &str, port: u16) -> Arc<dyn DeviceSession> {
        let key = format!("{}:{}", host, port);
        self.opened.lock().push(key.clone());

        match self.sessions.lock().get(&key) {
            Some(session) => Arc::clone(session) as Arc<dyn DeviceSession>,
            None => Arc::new(MemorySession::unreachable(host, port)),
        }
    }
}
