//! KiLight Device Session
//!
//! The contract between device-state synchronization and the hardware. A
//! [`DeviceSession`] owns the connection to one KiLight, holds the only copy
//! of its [`DeviceState`] snapshot and notifies subscribers whenever that
//! snapshot changes, whether the change was pushed by the device or fetched
//! by a query.
//!
//! # Architecture
//!
//! ```text
//! Device ──push──┐
//!                ├──> DeviceSession ──snapshot──> readers (Arc<DeviceState>)
//! Device <─query─┘         │
//!                          └──notify──> Subscribers (in registration order)
//! ```
//!
//! The wire codec, transport and retries are the session implementation's
//! business. This crate only fixes the surface everything above it relies on.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kilight_session::{Connector, OutputId, OutputWrite};
//!
//! let session = connector.open("192.168.1.40", kilight_session::DEFAULT_PORT);
//! let handle = session.register_callback(Box::new(|| println!("state changed")));
//!
//! session.update_state().await?;
//! println!("Output A brightness: {}", session.state().output_a.brightness);
//!
//! session
//!     .write_output(OutputId::OutputA, OutputWrite::new().power_on(true))
//!     .await?;
//!
//! handle.cancel();
//! session.disconnect().await;
//! ```
//!
//! # Testing
//!
//! Enable the `test-support` feature for [`memory::MemorySession`] and
//! [`memory::MemoryConnector`], a scriptable in-memory device.

pub mod error;
pub mod model;
pub mod session;
pub mod subscription;

#[cfg(any(test, feature = "test-support"))]
pub mod memory;

pub use error::{Result, SessionError};
pub use model::{
    clamp_color_temp, DeviceIdentity, DeviceState, OutputId, OutputState, Rgbcw, Temperature,
    MAX_COLOR_TEMP, MIN_COLOR_TEMP,
};
pub use session::{Connector, DeviceSession, OutputWrite, DEFAULT_PORT};
pub use subscription::{Callback, CancelHandle, SubscriptionGuard, SubscriptionId, Subscribers};
