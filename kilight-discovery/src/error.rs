//! Outcomes that end or interrupt a discovery flow.

use std::fmt;

/// Why a discovery flow ended without creating an entry.
///
/// Each reason has a stable key ([`AbortReason::as_str`]) that hosts use to
/// look up a translated message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AbortReason {
    /// Nothing was advertised by the time the user step ran
    NoDevicesFound,
    /// The advertisement came over IPv6, which devices do not serve
    UnsupportedAddressFamily,
    /// A device with this hardware id already has an entry
    AlreadyConfigured,
    /// The advertisement carried no `hwid` property
    MissingHardwareId,
}

impl AbortReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbortReason::NoDevicesFound => "no_devices_found",
            AbortReason::UnsupportedAddressFamily => "ipv6_not_supported",
            AbortReason::AlreadyConfigured => "already_configured",
            AbortReason::MissingHardwareId => "missing_hardware_id",
        }
    }
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NoDevicesFound => write!(f, "No devices found on the network"),
            AbortReason::UnsupportedAddressFamily => write!(f, "IPv6 is not supported"),
            AbortReason::AlreadyConfigured => write!(f, "Device is already configured"),
            AbortReason::MissingHardwareId => write!(f, "Advertisement has no hardware id"),
        }
    }
}

impl std::error::Error for AbortReason {}

/// Recoverable error shown on the selection form.
///
/// The flow stays interactive; the user may pick again without rediscovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormError {
    /// The probe timed out or the connection failed
    CannotConnect,
    /// The probe failed in an unexpected way
    Unknown,
    /// The selected hardware id is not among the candidates
    InvalidSelection,
}

impl FormError {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormError::CannotConnect => "cannot_connect",
            FormError::Unknown => "unknown",
            FormError::InvalidSelection => "invalid_selection",
        }
    }
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for FormError {}
