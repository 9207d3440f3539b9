//! The device session contract
//!
//! A session owns the connection to one device and is the only writer of its
//! [`DeviceState`] snapshot. Everything above this crate talks to hardware
//! exclusively through [`DeviceSession`]; the codec, transport and retry logic
//! live behind it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{DeviceState, OutputId, Rgbcw};
use crate::subscription::CancelHandle;

/// Port a KiLight listens on when the advertisement does not say otherwise
pub const DEFAULT_PORT: u16 = 5000;

/// Partial write of one output's fields
///
/// Only fields that are `Some` are sent to the device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputWrite {
    pub power_on: Option<bool>,
    pub brightness: Option<u8>,
    pub rgbcw: Option<Rgbcw>,
    pub color_temp: Option<u16>,
}

impl OutputWrite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn power_on(mut self, on: bool) -> Self {
        self.power_on = Some(on);
        self
    }

    pub fn brightness(mut self, brightness: u8) -> Self {
        self.brightness = Some(brightness);
        self
    }

    pub fn rgbcw(mut self, color: Rgbcw) -> Self {
        self.rgbcw = Some(color);
        self
    }

    pub fn color_temp(mut self, kelvin: u16) -> Self {
        self.color_temp = Some(kelvin);
        self
    }

    /// Whether the write carries no fields at all
    pub fn is_empty(&self) -> bool {
        self.power_on.is_none()
            && self.brightness.is_none()
            && self.rgbcw.is_none()
            && self.color_temp.is_none()
    }
}

/// Connection to a single device
///
/// `state()` is a cheap, non-blocking read of the current snapshot.
/// `update_state()` and `write_output()` are the only suspending operations.
/// Registered callbacks fire with no payload on every state change, whether
/// it came from a push or from a queried refresh.
#[async_trait]
pub trait DeviceSession: Send + Sync {
    /// Display name reported by the device
    fn name(&self) -> String;

    /// Host the session connects to
    fn host(&self) -> &str;

    /// Port the session connects to
    fn port(&self) -> u16;

    /// Current snapshot
    fn state(&self) -> Arc<DeviceState>;

    /// Query the device for its full state, replacing the snapshot
    async fn update_state(&self) -> Result<()>;

    /// Write some or all fields of one output
    async fn write_output(&self, output: OutputId, write: OutputWrite) -> Result<()>;

    /// Register a state-change callback
    fn register_callback(&self, callback: Box<dyn Fn() + Send + Sync>) -> CancelHandle;

    /// Close the connection; calling it again is a no-op
    async fn disconnect(&self);

    /// `host:port` form of the session address
    fn address(&self) -> String {
        format!("{}:{}", self.host(), self.port())
    }
}

/// Opens sessions to devices by address
pub trait Connector: Send + Sync {
    fn open(&self, host: &str, port: u16) -> Arc<dyn DeviceSession>;
}
