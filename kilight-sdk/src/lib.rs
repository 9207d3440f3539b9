//! # KiLight SDK
//!
//! Lights and sensors for KiLight lighting controllers, kept in sync with the
//! hardware:
//!
//! ```rust,ignore
//! use kilight_sdk::{ConfigEntry, DeviceConfig, Integration, LightIntent, OutputId};
//! use kilight_state::CoordinatorConfig;
//!
//! let entry = ConfigEntry::new("entry-1", "Kitchen", DeviceConfig::new("192.168.1.40", 5000));
//! let integration = Integration::setup(&connector, entry, CoordinatorConfig::default()).await?;
//!
//! let light = integration.registry().light(OutputId::OutputA).unwrap();
//! light.execute(LightIntent::set_brightness(128)).await?;
//!
//! let mut updates = integration.registry().subscribe();
//! while let Ok(update) = updates.recv().await {
//!     println!("{}: {:?}", update.unique_id, update.value);
//! }
//! ```
//!
//! ## Entities
//!
//! Every device gets an Output A light, an Output A current sensor and the
//! two fan sensors. Temperature sensors appear for each location the device
//! reports, and Output B entities only when the device has a second output at
//! setup time.
//!
//! ## Architecture
//!
//! ```text
//! kilight-sdk (entities, commands, lifecycle)
//!     ↓
//! kilight-state (handshake, polling, broadcast)
//!     ↓
//! kilight-session (session contract, snapshot)
//! ```
//!
//! New devices are found with [`kilight_discovery`], re-exported as
//! [`discovery`].

pub mod command;
pub mod config;
pub mod context;
pub mod entity;
mod error;
pub mod integration;

pub use command::{project, LightIntent, Projection};
pub use config::{ConfigEntry, DeviceConfig, DOMAIN};
pub use context::{DeviceContext, DeviceInfo};
pub use entity::{
    Capabilities, ColorMode, Entity, EntityKind, EntityRegistry, EntityUpdate, EntityValue,
    LightValue, Platform, SensorLocation,
};
pub use error::{EntityError, SdkError};
pub use integration::Integration;

pub use kilight_discovery as discovery;
pub use kilight_session::{OutputId, Rgbcw};
