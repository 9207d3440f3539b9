//! Hardware capabilities read from the first snapshot

use kilight_session::{DeviceState, OutputId};
use serde::Serialize;

use super::kind::{EntityKind, SensorLocation};

/// What the device reported having when the registry was built
///
/// Computed once; later snapshots never change it. A device that starts
/// reporting a second output after construction only gains its entities
/// after a reload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Capabilities {
    pub output_a_temperature: bool,
    pub driver_temperature: bool,
    pub power_supply_temperature: bool,
    pub output_b: bool,
    pub output_b_temperature: bool,
}

impl Capabilities {
    pub fn from_state(state: &DeviceState) -> Self {
        Self {
            output_a_temperature: state.output_a.temperature.is_some(),
            driver_temperature: state.driver_temperature.is_some(),
            power_supply_temperature: state.power_supply_temperature.is_some(),
            output_b: state.output_b.is_some(),
            output_b_temperature: state
                .output_b
                .as_ref()
                .is_some_and(|output| output.temperature.is_some()),
        }
    }

    /// Every entity kind the device supports, lights first
    pub fn entity_kinds(&self) -> Vec<EntityKind> {
        let mut kinds = vec![EntityKind::Light(OutputId::OutputA)];
        if self.output_b {
            kinds.push(EntityKind::Light(OutputId::OutputB));
        }

        kinds.push(EntityKind::Current(OutputId::OutputA));
        if self.output_a_temperature {
            kinds.push(EntityKind::Temperature(SensorLocation::OutputA));
        }
        if self.driver_temperature {
            kinds.push(EntityKind::Temperature(SensorLocation::Driver));
        }
        if self.power_supply_temperature {
            kinds.push(EntityKind::Temperature(SensorLocation::PowerSupply));
        }
        kinds.push(EntityKind::FanSpeed);
        kinds.push(EntityKind::FanDrivePercentage);

        if self.output_b {
            kinds.push(EntityKind::Current(OutputId::OutputB));
            if self.output_b_temperature {
                kinds.push(EntityKind::Temperature(SensorLocation::OutputB));
            }
        }

        kinds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kilight_session::{OutputState, Temperature};

    #[test]
    fn test_minimal_device() {
        let kinds = Capabilities::from_state(&DeviceState::default()).entity_kinds();
        assert_eq!(
            kinds,
            vec![
                EntityKind::Light(OutputId::OutputA),
                EntityKind::Current(OutputId::OutputA),
                EntityKind::FanSpeed,
                EntityKind::FanDrivePercentage,
            ]
        );
    }

    #[test]
    fn test_fully_equipped_device() {
        let with_temp = OutputState {
            temperature: Some(Temperature::from_celsius(30.0)),
            ..OutputState::default()
        };
        let state = DeviceState {
            output_a: with_temp.clone(),
            output_b: Some(with_temp),
            driver_temperature: Some(Temperature::from_celsius(35.0)),
            power_supply_temperature: Some(Temperature::from_celsius(40.0)),
            ..DeviceState::default()
        };

        let kinds = Capabilities::from_state(&state).entity_kinds();
        assert_eq!(kinds.len(), 10);
        assert!(kinds.contains(&EntityKind::Temperature(SensorLocation::OutputB)));
    }

    #[test]
    fn test_output_b_without_sensor() {
        let state = DeviceState {
            output_b: Some(OutputState::default()),
            ..DeviceState::default()
        };
        let caps = Capabilities::from_state(&state);
        assert!(caps.output_b);
        assert!(!caps.output_b_temperature);
        assert!(!caps
            .entity_kinds()
            .contains(&EntityKind::Temperature(SensorLocation::OutputB)));
    }
}
