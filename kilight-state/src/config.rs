//! Coordinator timing configuration

use std::time::Duration;

/// How often a device is polled when nothing else asks for a refresh
pub const UPDATE_EVERY: Duration = Duration::from_secs(30);

/// Upper bound for any single exchange with a device
pub const DEVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Timing knobs for a [`Coordinator`](crate::Coordinator)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Interval between background polls
    /// Default: 30 seconds
    pub poll_interval: Duration,

    /// Bound on the first fetch, the handshake wait and every refresh
    /// Default: 30 seconds
    pub device_timeout: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            poll_interval: UPDATE_EVERY,
            device_timeout: DEVICE_TIMEOUT,
        }
    }
}

impl CoordinatorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_device_timeout(mut self, timeout: Duration) -> Self {
        self.device_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CoordinatorConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.device_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_builders() {
        let config = CoordinatorConfig::new()
            .with_poll_interval(Duration::from_secs(5))
            .with_device_timeout(Duration::from_secs(2));
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.device_timeout, Duration::from_secs(2));
    }
}
