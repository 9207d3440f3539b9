//! The discovery flow state machine.
//!
//! ```text
//! Idle ──advertisement──> Collecting ──step_user──> UserSelecting ──select──> Probing
//!                              │                         ^                      │
//!                              └──> NoDevicesFound        └──── form error ──────┤
//!                                                                               ├──> Created
//!                                                                               └──> Aborted
//! ```
//!
//! Advertisements are collected into a [`CandidateSet`] keyed by hardware id.
//! Selecting a candidate opens a throwaway session, queries it once under a
//! timeout and closes it again. A probe failure returns the user to the form
//! with the candidate list untouched.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use kilight_session::{Connector, SessionError};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::advertisement::Advertisement;
use crate::candidates::{Candidate, CandidateSet};
use crate::error::{AbortReason, FormError};

/// Default bound on the connectivity probe
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Step id of the selection form
pub const USER_STEP: &str = "user";

/// Form error key for errors not tied to a single field
pub const BASE_ERROR: &str = "base";

/// Where the flow currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Collecting,
    UserSelecting,
    NoDevicesFound,
    Probing,
    Created,
    Aborted(AbortReason),
}

impl FlowState {
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            FlowState::Created | FlowState::Aborted(_) | FlowState::NoDevicesFound
        )
    }
}

/// Flow tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowConfig {
    /// Bound on the connectivity probe
    /// Default: 30 seconds
    pub probe_timeout: Duration,

    /// Probe straight away when exactly one candidate is known
    /// Default: false
    pub auto_select_single: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            auto_select_single: false,
        }
    }
}

impl FlowConfig {
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    pub fn with_auto_select_single(mut self, enabled: bool) -> Self {
        self.auto_select_single = enabled;
        self
    }
}

/// One choice in the selection form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// Hardware id submitted back when chosen
    pub value: String,
    /// `hostname (host:port)`
    pub label: String,
}

/// Selection form to show the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form {
    pub step_id: &'static str,
    pub options: Vec<SelectOption>,
    pub errors: BTreeMap<&'static str, FormError>,
}

impl Form {
    /// Error not tied to a field, if any
    pub fn base_error(&self) -> Option<FormError> {
        self.errors.get(BASE_ERROR).copied()
    }
}

/// Data of the entry to create once a device is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEntry {
    /// Device name reported by the probe
    pub title: String,
    /// Hardware id, the entry's unique id
    pub unique_id: String,
    pub host: String,
    pub port: u16,
}

/// What a flow step produced
#[derive(Debug, Clone, PartialEq)]
pub enum FlowResult {
    Form(Form),
    Created(CreatedEntry),
    Aborted(AbortReason),
}

/// Turns advertisements into one configured device
///
/// Known hardware ids are passed in up front; the flow never adds an entry
/// for one of them.
pub struct DiscoveryFlow<C: Connector> {
    connector: Arc<C>,
    config: FlowConfig,
    configured: HashSet<String>,
    candidates: CandidateSet,
    state: FlowState,
    title_placeholder: Option<String>,
    result: Option<FlowResult>,
}

impl<C: Connector> DiscoveryFlow<C> {
    pub fn new(connector: Arc<C>, configured: impl IntoIterator<Item = String>) -> Self {
        Self::with_config(connector, configured, FlowConfig::default())
    }

    pub fn with_config(
        connector: Arc<C>,
        configured: impl IntoIterator<Item = String>,
        config: FlowConfig,
    ) -> Self {
        Self {
            connector,
            config,
            configured: configured.into_iter().collect(),
            candidates: CandidateSet::new(),
            state: FlowState::Idle,
            title_placeholder: None,
            result: None,
        }
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn candidates(&self) -> &CandidateSet {
        &self.candidates
    }

    /// Name shown for the in-progress flow, set by the zeroconf step
    pub fn title_placeholder(&self) -> Option<&str> {
        self.title_placeholder.as_deref()
    }

    /// Add an advertisement to the candidate set
    ///
    /// Rejected advertisements leave the set and the flow state unchanged.
    /// Returns `true` when the hardware id was not seen before.
    pub fn add_advertisement(&mut self, ad: &Advertisement) -> Result<bool, AbortReason> {
        if ad.is_ipv6() {
            debug!(hostname = %ad.hostname, address = %ad.address, "Ignoring IPv6 advertisement");
            return Err(AbortReason::UnsupportedAddressFamily);
        }

        let candidate = Candidate::from_advertisement(ad).ok_or(AbortReason::MissingHardwareId)?;

        if self.configured.contains(&candidate.hardware_id) {
            debug!(hardware_id = %candidate.hardware_id, "Advertised device already configured");
            return Err(AbortReason::AlreadyConfigured);
        }

        debug!(
            hardware_id = %candidate.hardware_id,
            host = %candidate.host,
            port = candidate.port,
            "Collected KiLight advertisement"
        );

        if self.state == FlowState::Idle {
            self.state = FlowState::Collecting;
        }
        Ok(self.candidates.upsert(candidate))
    }

    /// Entry point for an advertisement-triggered flow
    ///
    /// A rejected advertisement ends the flow. Otherwise the flow continues
    /// with the user step.
    pub async fn step_zeroconf(&mut self, ad: Advertisement) -> FlowResult {
        if let Some(result) = &self.result {
            return result.clone();
        }

        if let Err(reason) = self.add_advertisement(&ad) {
            return self.abort(reason);
        }

        self.title_placeholder = Some(ad.hostname.clone());
        self.step_user(None).await
    }

    /// The selection step
    ///
    /// Without a selection this shows the form (or probes the only candidate
    /// when auto-selection is on). With a selection it probes that candidate.
    pub async fn step_user(&mut self, selection: Option<&str>) -> FlowResult {
        if let Some(result) = &self.result {
            return result.clone();
        }

        if self.candidates.is_empty() {
            self.state = FlowState::NoDevicesFound;
            return self.finish(FlowResult::Aborted(AbortReason::NoDevicesFound));
        }

        let selected = match selection {
            Some(hardware_id) => match self.candidates.get(hardware_id) {
                Some(candidate) => candidate.clone(),
                None => return self.show_form(Some(FormError::InvalidSelection)),
            },
            None => match self.candidates.single() {
                Some(candidate) if self.config.auto_select_single => candidate.clone(),
                _ => return self.show_form(None),
            },
        };

        self.probe(selected).await
    }

    async fn probe(&mut self, candidate: Candidate) -> FlowResult {
        if self.configured.contains(&candidate.hardware_id) {
            return self.abort(AbortReason::AlreadyConfigured);
        }

        self.state = FlowState::Probing;
        debug!(hardware_id = %candidate.hardware_id, host = %candidate.host, "Probing candidate");

        let session = self.connector.open(&candidate.host, candidate.port);
        let outcome = match timeout(self.config.probe_timeout, session.update_state()).await {
            Ok(result) => result,
            Err(_) => Err(SessionError::NetworkTimeout(format!(
                "no reply within {:?}",
                self.config.probe_timeout
            ))),
        };
        let name = session.name();
        let probed_id = session.state().identity.hardware_id.clone();
        session.disconnect().await;

        match outcome {
            Ok(()) => {
                let unique_id = if probed_id.is_empty() {
                    candidate.hardware_id.clone()
                } else {
                    probed_id
                };

                if self.configured.contains(&unique_id) {
                    return self.abort(AbortReason::AlreadyConfigured);
                }

                self.state = FlowState::Created;
                self.finish(FlowResult::Created(CreatedEntry {
                    title: name,
                    unique_id,
                    host: candidate.host,
                    port: candidate.port,
                }))
            }
            Err(err) if err.is_connectivity() => {
                warn!(host = %candidate.host, error = %err, "Could not reach device during probe");
                self.show_form(Some(FormError::CannotConnect))
            }
            Err(err) => {
                error!(host = %candidate.host, error = ?err, "Unexpected error while probing device");
                self.show_form(Some(FormError::Unknown))
            }
        }
    }

    fn show_form(&mut self, error: Option<FormError>) -> FlowResult {
        self.state = FlowState::UserSelecting;

        let options = self
            .candidates
            .iter()
            .map(|candidate| SelectOption {
                value: candidate.hardware_id.clone(),
                label: candidate.label(),
            })
            .collect();

        let mut errors = BTreeMap::new();
        if let Some(error) = error {
            errors.insert(BASE_ERROR, error);
        }

        FlowResult::Form(Form {
            step_id: USER_STEP,
            options,
            errors,
        })
    }

    fn abort(&mut self, reason: AbortReason) -> FlowResult {
        self.state = FlowState::Aborted(reason);
        self.finish(FlowResult::Aborted(reason))
    }

    fn finish(&mut self, result: FlowResult) -> FlowResult {
        self.result = Some(result.clone());
        result
    }
}
