//! Entity kinds and their value projections
//!
//! Every entity is one [`EntityKind`] bound to a device. The kind decides the
//! metadata (unique-id suffix, name, unit, precision) and how a display value
//! is read out of a [`DeviceState`].

use kilight_session::{DeviceState, OutputId, OutputState, Rgbcw, Temperature};
use serde::{Deserialize, Serialize};

use crate::error::EntityError;

/// Where a temperature sensor sits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorLocation {
    Driver,
    PowerSupply,
    OutputA,
    OutputB,
}

impl SensorLocation {
    /// Name used in unique ids
    pub fn as_str(self) -> &'static str {
        match self {
            SensorLocation::Driver => "Driver",
            SensorLocation::PowerSupply => "PowerSupply",
            SensorLocation::OutputA => "OutputA",
            SensorLocation::OutputB => "OutputB",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            SensorLocation::Driver => "Driver",
            SensorLocation::PowerSupply => "Power Supply",
            SensorLocation::OutputA => "Output A",
            SensorLocation::OutputB => "Output B",
        }
    }

    /// Output the sensor belongs to, for per-output sensors
    pub fn output(self) -> Option<OutputId> {
        match self {
            SensorLocation::OutputA => Some(OutputId::OutputA),
            SensorLocation::OutputB => Some(OutputId::OutputB),
            SensorLocation::Driver | SensorLocation::PowerSupply => None,
        }
    }

    /// Current reading at this location, if the device reports one
    pub fn read(self, state: &DeviceState) -> Option<Temperature> {
        match self {
            SensorLocation::Driver => state.driver_temperature,
            SensorLocation::PowerSupply => state.power_supply_temperature,
            SensorLocation::OutputA | SensorLocation::OutputB => self
                .output()
                .and_then(|output| state.output(output))
                .and_then(|output| output.temperature),
        }
    }
}

/// Which platform an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Light,
    Sensor,
}

/// Color mode of a light entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorMode {
    ColorTemp,
    Rgbww,
}

/// Color modes every KiLight output supports
pub const SUPPORTED_COLOR_MODES: [ColorMode; 2] = [ColorMode::ColorTemp, ColorMode::Rgbww];

/// Displayed state of a light entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightValue {
    pub is_on: bool,
    pub brightness: u8,
    pub rgbww: Rgbcw,
    pub color_temp_kelvin: u16,
}

impl From<&OutputState> for LightValue {
    fn from(output: &OutputState) -> Self {
        Self {
            is_on: output.power_on,
            brightness: output.brightness,
            rgbww: output.rgbcw,
            color_temp_kelvin: output.color_temp,
        }
    }
}

/// Displayed value of any entity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityValue {
    Light(LightValue),
    Measurement(f64),
}

impl EntityValue {
    pub fn as_light(&self) -> Option<&LightValue> {
        match self {
            EntityValue::Light(light) => Some(light),
            EntityValue::Measurement(_) => None,
        }
    }

    pub fn as_measurement(&self) -> Option<f64> {
        match self {
            EntityValue::Measurement(value) => Some(*value),
            EntityValue::Light(_) => None,
        }
    }
}

/// What an entity shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Light(OutputId),
    Current(OutputId),
    Temperature(SensorLocation),
    FanSpeed,
    FanDrivePercentage,
}

impl EntityKind {
    pub fn platform(&self) -> Platform {
        match self {
            EntityKind::Light(_) => Platform::Light,
            _ => Platform::Sensor,
        }
    }

    /// Appended to the hardware id to form the unique id
    pub fn unique_id_suffix(&self) -> String {
        match self {
            EntityKind::Light(output) => format!("_{}_light", output.as_str()),
            EntityKind::Current(output) => format!("_{}_current", output.as_str()),
            EntityKind::Temperature(location) => format!("_{}_temperature", location.as_str()),
            EntityKind::FanSpeed => "_fan_speed".to_string(),
            EntityKind::FanDrivePercentage => "_fan_drive_percentage".to_string(),
        }
    }

    pub fn name(&self) -> String {
        match self {
            EntityKind::Light(output) => format!("Output {} Light", output.letter()),
            EntityKind::Current(output) => format!("Output {} Current", output.letter()),
            EntityKind::Temperature(location) => format!("{} Temperature", location.display_name()),
            EntityKind::FanSpeed => "Fan Speed".to_string(),
            EntityKind::FanDrivePercentage => "Fan Drive Level".to_string(),
        }
    }

    pub fn translation_key(&self) -> &'static str {
        match self {
            EntityKind::Light(_) => "output_light",
            EntityKind::Current(_) => "output_current",
            EntityKind::Temperature(_) => "component_temperature",
            EntityKind::FanSpeed => "fan_speed",
            EntityKind::FanDrivePercentage => "fan_drive_percentage",
        }
    }

    pub fn unit(&self) -> Option<&'static str> {
        match self {
            EntityKind::Light(_) => None,
            EntityKind::Current(_) => Some("A"),
            EntityKind::Temperature(_) => Some("°C"),
            EntityKind::FanSpeed => Some("RPM"),
            EntityKind::FanDrivePercentage => Some("%"),
        }
    }

    /// Suggested number of decimals when displayed
    pub fn precision(&self) -> Option<u8> {
        match self {
            EntityKind::Light(_) => None,
            EntityKind::Current(_) => Some(3),
            EntityKind::Temperature(_) => Some(2),
            EntityKind::FanSpeed => Some(0),
            EntityKind::FanDrivePercentage => Some(1),
        }
    }

    pub fn icon(&self) -> Option<&'static str> {
        match self {
            EntityKind::Current(_) => Some("mdi:current-dc"),
            EntityKind::FanSpeed | EntityKind::FanDrivePercentage => Some("mdi:fan"),
            _ => None,
        }
    }

    /// Output addressed by light commands
    pub fn light_output(&self) -> Option<OutputId> {
        match self {
            EntityKind::Light(output) => Some(*output),
            _ => None,
        }
    }

    /// Fail fast when the state has nothing for this kind to show
    pub fn validate(&self, state: &DeviceState) -> Result<(), EntityError> {
        match self {
            EntityKind::Light(output) | EntityKind::Current(output) => state
                .output(*output)
                .map(|_| ())
                .ok_or(EntityError::UnknownOutput(*output)),
            EntityKind::Temperature(location) => location
                .read(state)
                .map(|_| ())
                .ok_or(EntityError::UnknownSensorLocation(*location)),
            EntityKind::FanSpeed | EntityKind::FanDrivePercentage => Ok(()),
        }
    }

    /// Read this kind's display value out of a snapshot
    ///
    /// `None` means the snapshot has no value for it; callers keep whatever
    /// they showed before.
    pub fn project(&self, state: &DeviceState) -> Option<EntityValue> {
        match self {
            EntityKind::Light(output) => state
                .output(*output)
                .map(|output| EntityValue::Light(LightValue::from(output))),
            EntityKind::Current(output) => state
                .output(*output)
                .map(|output| EntityValue::Measurement(output.current)),
            EntityKind::Temperature(location) => location
                .read(state)
                .map(|temperature| EntityValue::Measurement(temperature.celsius())),
            EntityKind::FanSpeed => Some(EntityValue::Measurement(f64::from(state.fan_speed))),
            EntityKind::FanDrivePercentage => {
                Some(EntityValue::Measurement(state.fan_drive_percentage))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(EntityKind::Light(OutputId::OutputA), "_OutputA_light", "Output A Light")]
    #[case(EntityKind::Current(OutputId::OutputB), "_OutputB_current", "Output B Current")]
    #[case(EntityKind::Temperature(SensorLocation::Driver), "_Driver_temperature", "Driver Temperature")]
    #[case(
        EntityKind::Temperature(SensorLocation::PowerSupply),
        "_PowerSupply_temperature",
        "Power Supply Temperature"
    )]
    #[case(EntityKind::FanSpeed, "_fan_speed", "Fan Speed")]
    #[case(EntityKind::FanDrivePercentage, "_fan_drive_percentage", "Fan Drive Level")]
    fn test_metadata(#[case] kind: EntityKind, #[case] suffix: &str, #[case] name: &str) {
        assert_eq!(kind.unique_id_suffix(), suffix);
        assert_eq!(kind.name(), name);
    }

    #[rstest]
    #[case(EntityKind::Current(OutputId::OutputA), "A", 3)]
    #[case(EntityKind::Temperature(SensorLocation::OutputA), "°C", 2)]
    #[case(EntityKind::FanSpeed, "RPM", 0)]
    #[case(EntityKind::FanDrivePercentage, "%", 1)]
    fn test_units(#[case] kind: EntityKind, #[case] unit: &str, #[case] precision: u8) {
        assert_eq!(kind.unit(), Some(unit));
        assert_eq!(kind.precision(), Some(precision));
        assert_eq!(kind.platform(), Platform::Sensor);
    }

    #[test]
    fn test_validate_missing_output_b() {
        let state = DeviceState::default();
        assert_eq!(
            EntityKind::Light(OutputId::OutputB).validate(&state),
            Err(EntityError::UnknownOutput(OutputId::OutputB))
        );
        assert_eq!(
            EntityKind::Temperature(SensorLocation::Driver).validate(&state),
            Err(EntityError::UnknownSensorLocation(SensorLocation::Driver))
        );
        assert!(EntityKind::FanSpeed.validate(&state).is_ok());
    }

    #[test]
    fn test_project_values() {
        let state = DeviceState {
            output_a: OutputState {
                power_on: true,
                brightness: 77,
                current: 1.25,
                temperature: Some(Temperature::from_celsius(41.5)),
                ..OutputState::default()
            },
            fan_speed: 900,
            ..DeviceState::default()
        };

        let light = EntityKind::Light(OutputId::OutputA).project(&state).unwrap();
        assert_eq!(light.as_light().map(|l| (l.is_on, l.brightness)), Some((true, 77)));
        assert_eq!(
            EntityKind::Current(OutputId::OutputA).project(&state),
            Some(EntityValue::Measurement(1.25))
        );
        assert_eq!(
            EntityKind::Temperature(SensorLocation::OutputA).project(&state),
            Some(EntityValue::Measurement(41.5))
        );
        assert_eq!(
            EntityKind::FanSpeed.project(&state).and_then(|v| v.as_measurement()),
            Some(900.0)
        );
        assert_eq!(EntityKind::Current(OutputId::OutputB).project(&state), None);
    }
}
