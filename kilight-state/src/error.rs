//! Error types for kilight-state

use std::time::Duration;

use kilight_session::SessionError;
use thiserror::Error;

/// Errors raised while bringing a device up or keeping it in sync
///
/// Every variant names the device, so the message is useful on its own in a
/// log line or a setup-failure notice.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    /// The first fetch succeeded but no state-change notification arrived
    #[error(
        "Unable to communicate with \"{name}\" ({address}); Please make sure the device is connected to the network."
    )]
    SetupTimeout {
        name: String,
        address: String,
        waited: Duration,
    },

    /// The first state fetch failed or timed out
    #[error("First refresh of \"{name}\" ({address}) failed: {source}")]
    FirstRefreshFailed {
        name: String,
        address: String,
        #[source]
        source: SessionError,
    },

    /// A refresh after setup failed or timed out
    #[error("Refresh of \"{name}\" ({address}) failed: {source}")]
    RefreshFailed {
        name: String,
        address: String,
        #[source]
        source: SessionError,
    },
}

impl StateError {
    /// Name of the device the error is about
    pub fn device_name(&self) -> &str {
        match self {
            StateError::SetupTimeout { name, .. }
            | StateError::FirstRefreshFailed { name, .. }
            | StateError::RefreshFailed { name, .. } => name,
        }
    }

    /// Underlying session error, if the failure came from the session
    pub fn session_error(&self) -> Option<&SessionError> {
        match self {
            StateError::SetupTimeout { .. } => None,
            StateError::FirstRefreshFailed { source, .. } | StateError::RefreshFailed { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Result type for coordinator operations
pub type Result<T> = std::result::Result<T, StateError>;
