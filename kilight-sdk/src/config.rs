//! Persisted configuration of a KiLight entry
//!
//! The host stores a [`ConfigEntry`] per device and hands it back on every
//! start. Only the connection details live in `data`; everything else is
//! read from the device.

use kilight_discovery::CreatedEntry;
use kilight_session::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

use crate::SdkError;

/// Integration domain, used in device identifiers
pub const DOMAIN: &str = "kilight";

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Where to reach a device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceConfig {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl DeviceConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Parse from the stored JSON form
    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let config: Self = serde_json::from_str(json).map_err(|e| SdkError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, SdkError> {
        serde_json::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), SdkError> {
        if self.host.trim().is_empty() {
            return Err(SdkError::Config("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(SdkError::Config("port must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// One configured device as the host persists it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub entry_id: String,
    /// User-visible name, initially the device name
    pub title: String,
    /// Hardware id of the device
    #[serde(default)]
    pub unique_id: Option<String>,
    pub data: DeviceConfig,
}

impl ConfigEntry {
    pub fn new(entry_id: impl Into<String>, title: impl Into<String>, data: DeviceConfig) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: title.into(),
            unique_id: None,
            data,
        }
    }

    /// Entry for a device accepted by the discovery flow
    pub fn from_created(entry_id: impl Into<String>, created: CreatedEntry) -> Self {
        Self {
            entry_id: entry_id.into(),
            title: created.title,
            unique_id: Some(created.unique_id),
            data: DeviceConfig::new(created.host, created.port),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn from_json(json: &str) -> Result<Self, SdkError> {
        let entry: Self = serde_json::from_str(json).map_err(|e| SdkError::Config(e.to_string()))?;
        entry.data.validate()?;
        Ok(entry)
    }

    pub fn to_json(&self) -> Result<String, SdkError> {
        serde_json::to_string(self).map_err(|e| SdkError::Config(e.to_string()))
    }
}
