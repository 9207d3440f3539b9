//! Logging setup for KiLight hosts
//!
//! Library code only emits `tracing` events. Applications pick how those are
//! rendered by calling one of the init functions here once at startup.
//!
//! ```rust,ignore
//! // Honors KILIGHT_LOG_MODE and KILIGHT_LOG_LEVEL
//! kilight_state::logging::init_logging_from_env()?;
//! ```

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Crates whose events are shown when no filter is configured
const KILIGHT_TARGETS: [&str; 4] = [
    "kilight_session",
    "kilight_state",
    "kilight_discovery",
    "kilight_sdk",
];

/// How log output is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoggingMode {
    /// No subscriber is installed
    Silent,
    /// Compact stderr lines at `info`
    Development,
    /// Multi-line stderr output at `debug` with source locations
    Debug,
    /// One JSON object per event at `info`, for log shippers
    Json,
}

impl LoggingMode {
    /// Parse the value of `KILIGHT_LOG_MODE`
    ///
    /// Unknown values fall back to [`LoggingMode::Silent`].
    pub fn from_env_value(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => LoggingMode::Development,
            "debug" => LoggingMode::Debug,
            "json" => LoggingMode::Json,
            _ => LoggingMode::Silent,
        }
    }

    fn default_level(self) -> Option<&'static str> {
        match self {
            LoggingMode::Silent => None,
            LoggingMode::Development | LoggingMode::Json => Some("info"),
            LoggingMode::Debug => Some("debug"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),
}

/// Install a global subscriber for `mode`
///
/// Fails if another subscriber was installed first. [`LoggingMode::Silent`]
/// installs nothing and always succeeds.
///
/// # Environment Variables
///
/// - `KILIGHT_LOG_LEVEL`: filter directive replacing the mode's default
/// - `RUST_LOG`: used when `KILIGHT_LOG_LEVEL` is unset
pub fn init_logging(mode: LoggingMode) -> Result<(), LoggingError> {
    let Some(level) = mode.default_level() else {
        return Ok(());
    };
    let filter = create_env_filter(level);
    let registry = Registry::default().with(filter);

    let result = match mode {
        LoggingMode::Development => registry
            .with(fmt::layer().compact().with_target(false).with_writer(std::io::stderr))
            .try_init(),
        LoggingMode::Debug => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LoggingMode::Json => registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .try_init(),
        LoggingMode::Silent => return Ok(()),
    };

    result.map_err(|e| LoggingError::TracingInit(e.to_string()))
}

/// Install a subscriber chosen by `KILIGHT_LOG_MODE`
///
/// Accepts `silent`, `development` (or `dev`), `debug` and `json`. Unset
/// means silent.
pub fn init_logging_from_env() -> Result<(), LoggingError> {
    let mode = std::env::var("KILIGHT_LOG_MODE")
        .map(|value| LoggingMode::from_env_value(&value))
        .unwrap_or(LoggingMode::Silent);

    init_logging(mode)
}

fn create_env_filter(default_level: &str) -> EnvFilter {
    let directives = std::env::var("KILIGHT_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_directives(default_level));

    EnvFilter::new(directives)
}

/// `warn` for everything, `level` for the KiLight crates
fn default_directives(level: &str) -> String {
    let mut directives = vec!["warn".to_string()];
    directives.extend(KILIGHT_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

/// Whether a global subscriber is already installed
pub fn is_initialized() -> bool {
    tracing::dispatcher::has_been_set()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_silent_mode() {
        assert!(init_logging(LoggingMode::Silent).is_ok());
    }

    #[rstest]
    #[case("development", LoggingMode::Development)]
    #[case("DEV", LoggingMode::Development)]
    #[case("debug", LoggingMode::Debug)]
    #[case(" json ", LoggingMode::Json)]
    #[case("silent", LoggingMode::Silent)]
    #[case("verbose", LoggingMode::Silent)]
    fn test_mode_from_env_value(#[case] value: &str, #[case] expected: LoggingMode) {
        assert_eq!(LoggingMode::from_env_value(value), expected);
    }

    #[test]
    fn test_default_directives_scope_kilight_crates() {
        assert_eq!(
            default_directives("debug"),
            "warn,kilight_session=debug,kilight_state=debug,kilight_discovery=debug,kilight_sdk=debug"
        );
    }
}
