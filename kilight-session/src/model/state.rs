//! Whole-device state snapshot

use serde::{Deserialize, Serialize};

use super::{DeviceIdentity, OutputId, OutputState, Temperature};

/// Complete state of a device as of the latest push or poll
///
/// The session replaces its snapshot wholesale on every update, so readers
/// holding an `Arc<DeviceState>` always see one consistent generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Identity fields reported alongside the telemetry
    pub identity: DeviceIdentity,
    /// First output; every device has one
    pub output_a: OutputState,
    /// Second output; `None` on single-channel hardware
    pub output_b: Option<OutputState>,
    /// LED driver temperature
    pub driver_temperature: Option<Temperature>,
    /// Power supply temperature
    pub power_supply_temperature: Option<Temperature>,
    /// Cooling fan speed in RPM
    pub fan_speed: u32,
    /// Cooling fan drive level, 0-100
    pub fan_drive_percentage: f64,
}

impl DeviceState {
    /// Look up the state of one output
    ///
    /// Returns `None` for [`OutputId::OutputB`] on single-output hardware.
    pub fn output(&self, output: OutputId) -> Option<&OutputState> {
        match output {
            OutputId::OutputA => Some(&self.output_a),
            OutputId::OutputB => self.output_b.as_ref(),
        }
    }

    /// Mutable counterpart of [`DeviceState::output`]
    pub fn output_mut(&mut self, output: OutputId) -> Option<&mut OutputState> {
        match output {
            OutputId::OutputA => Some(&mut self.output_a),
            OutputId::OutputB => self.output_b.as_mut(),
        }
    }

    /// Whether the device exposes a second output
    pub fn has_output_b(&self) -> bool {
        self.output_b.is_some()
    }
}
