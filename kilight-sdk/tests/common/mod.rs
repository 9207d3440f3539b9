//! Shared fixtures for kilight-sdk integration tests

#![allow(dead_code)]

use std::sync::Arc;

use kilight_sdk::{ConfigEntry, DeviceConfig, EntityUpdate};
use kilight_session::memory::{MemoryConnector, MemorySession};
use kilight_session::{DeviceIdentity, DeviceState, OutputState, Rgbcw, Temperature};
use tokio::sync::broadcast;

pub const HOST: &str = "192.168.1.40";
pub const PORT: u16 = 5000;

pub fn identity() -> DeviceIdentity {
    DeviceIdentity {
        hardware_id: "KL-7F3A".into(),
        manufacturer: "KiLight".into(),
        model: "KL-2CH".into(),
        firmware_version: "1.4.2".into(),
        hardware_version: "3".into(),
    }
}

/// Device with only Output A and no temperature sensors
pub fn single_output() -> DeviceState {
    DeviceState {
        identity: identity(),
        output_a: OutputState {
            power_on: false,
            brightness: 20,
            rgbcw: Rgbcw::new(0, 0, 0, 128, 128),
            color_temp: 3000,
            current: 0.125,
            temperature: None,
        },
        fan_speed: 1100,
        fan_drive_percentage: 35.5,
        ..DeviceState::default()
    }
}

/// Device with both outputs and every temperature sensor
pub fn dual_output() -> DeviceState {
    let mut state = single_output();
    state.output_a.temperature = Some(Temperature::from_celsius(38.25));
    state.output_b = Some(OutputState {
        power_on: true,
        brightness: 200,
        temperature: Some(Temperature::from_celsius(40.5)),
        ..OutputState::default()
    });
    state.driver_temperature = Some(Temperature::from_celsius(45.0));
    state.power_supply_temperature = Some(Temperature::from_celsius(50.75));
    state
}

pub fn session(state: DeviceState) -> Arc<MemorySession> {
    Arc::new(MemorySession::new("Kitchen KiLight", HOST, PORT, state))
}

pub fn connector_with(session: &Arc<MemorySession>) -> MemoryConnector {
    let connector = MemoryConnector::new();
    connector.insert(Arc::clone(session));
    connector
}

pub fn entry() -> ConfigEntry {
    ConfigEntry::new("entry-1", "Kitchen", DeviceConfig::new(HOST, PORT))
}

/// Drain whatever is buffered on an update receiver
pub fn drain(updates: &mut broadcast::Receiver<EntityUpdate>) -> Vec<EntityUpdate> {
    let mut received = Vec::new();
    while let Ok(update) = updates.try_recv() {
        received.push(update);
    }
    received
}
