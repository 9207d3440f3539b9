//! Device identity type

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable hardware identity of a KiLight
///
/// Reported by the device with every state snapshot, but only the values seen
/// at the first successful fetch are used: the hardware id keys discovery
/// dedup and every entity unique id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DeviceIdentity {
    /// Hardware identifier, also advertised as the `hwid` TXT record
    pub hardware_id: String,
    /// Manufacturer name
    pub manufacturer: String,
    /// Model name
    pub model: String,
    /// Firmware version string
    pub firmware_version: String,
    /// Hardware revision string
    pub hardware_version: String,
}

impl DeviceIdentity {
    /// Create an identity with only the hardware id known
    pub fn new(hardware_id: impl Into<String>) -> Self {
        Self {
            hardware_id: hardware_id.into(),
            ..Self::default()
        }
    }

    /// Whether the device has reported a hardware id yet
    pub fn is_known(&self) -> bool {
        !self.hardware_id.is_empty()
    }
}

impl fmt::Display for DeviceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.manufacturer, self.model, self.hardware_id)
    }
}
