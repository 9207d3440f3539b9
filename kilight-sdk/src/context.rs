//! Per-device context shared by entities and commands

use std::sync::Arc;

use kilight_session::{DeviceIdentity, DeviceSession};
use kilight_state::Coordinator;
use serde::Serialize;

use crate::config::DOMAIN;

/// Device registry information attached to every entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// `(domain, hardware id)`
    pub identifier: (String, String),
    /// Entry title
    pub name: String,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
    pub hw_version: String,
}

/// Everything an entity needs to reach its device
///
/// Built once per configured device after the handshake. The identity is
/// captured from the first snapshot and does not change afterwards.
pub struct DeviceContext {
    pub(crate) title: String,
    pub(crate) session: Arc<dyn DeviceSession>,
    pub(crate) coordinator: Coordinator,
    pub(crate) identity: DeviceIdentity,
}

impl DeviceContext {
    pub fn new(title: impl Into<String>, session: Arc<dyn DeviceSession>, coordinator: Coordinator) -> Arc<Self> {
        let identity = session.state().identity.clone();
        Arc::new(Self {
            title: title.into(),
            session,
            coordinator,
            identity,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn session(&self) -> &Arc<dyn DeviceSession> {
        &self.session
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            identifier: (DOMAIN.to_string(), self.identity.hardware_id.clone()),
            name: self.title.clone(),
            manufacturer: self.identity.manufacturer.clone(),
            model: self.identity.model.clone(),
            sw_version: self.identity.firmware_version.clone(),
            hw_version: self.identity.hardware_version.clone(),
        }
    }
}

impl std::fmt::Debug for DeviceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceContext")
            .field("title", &self.title)
            .field("address", &self.session.address())
            .field("identity", &self.identity)
            .finish()
    }
}
