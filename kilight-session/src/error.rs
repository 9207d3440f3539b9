//! Error types for the device session contract.

use thiserror::Error;

/// Errors a device session can report while talking to the hardware
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The device did not answer within the session's own timeout
    #[error("Network timeout: {0}")]
    NetworkTimeout(String),

    /// The connection could not be opened or was dropped mid-request
    #[error("Transport error: {0}")]
    Transport(String),

    /// The device answered with something the codec could not make sense of
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The session was already disconnected
    #[error("Session is disconnected")]
    Disconnected,
}

impl SessionError {
    /// Whether this error means the device could not be reached at all.
    ///
    /// Timeouts and transport failures are worth retrying; protocol errors and
    /// a closed session are not.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, SessionError::NetworkTimeout(_) | SessionError::Transport(_))
    }
}

/// Result type for session operations
pub type Result<T> = std::result::Result<T, SessionError>;
