//! KiLight State Synchronization
//!
//! Keeps the host-visible state of one KiLight in step with the hardware.
//!
//! # Features
//!
//! - **Bounded startup**: the handshake never waits longer than the device
//!   timeout, and fails with a descriptive [`StateError`] instead
//! - **Poll + push reconciliation**: periodic refreshes and device pushes feed
//!   the same broadcast, in arrival order
//! - **Self-healing polls**: a failed poll is logged and the next tick retries
//!
//! # Architecture
//!
//! ```text
//! DeviceSession ──notify──> Coordinator ──broadcast──> listeners (entities)
//!       ^                        │
//!       └──── update_state ──────┘ (every poll interval)
//! ```
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kilight_state::{Coordinator, CoordinatorConfig};
//!
//! kilight_state::logging::init_logging_from_env()?;
//!
//! let coordinator = Coordinator::new(session, CoordinatorConfig::default());
//! coordinator.start_and_wait_ready().await?;
//! coordinator.start_polling();
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod logging;

pub use config::{CoordinatorConfig, DEVICE_TIMEOUT, UPDATE_EVERY};
pub use coordinator::{Coordinator, RunState};
pub use error::{Result, StateError};
pub use logging::{init_logging, init_logging_from_env, LoggingError, LoggingMode};
