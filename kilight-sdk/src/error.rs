use kilight_session::{OutputId, SessionError};
use kilight_state::StateError;
use thiserror::Error;

use crate::entity::SensorLocation;

/// Entity construction errors
///
/// These only occur when an entity is built for hardware the device does not
/// have, which the capability rules never do.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntityError {
    #[error("Unknown output: {0}")]
    UnknownOutput(OutputId),

    #[error("Unknown temperature sensor: {0:?}")]
    UnknownSensorLocation(SensorLocation),

    #[error("Entity {0} does not accept light commands")]
    NotControllable(String),
}

#[derive(Error, Debug)]
pub enum SdkError {
    #[error("Device not ready: {0}")]
    NotReady(#[from] StateError),

    #[error("Entity error: {0}")]
    Entity(#[from] EntityError),

    #[error("Command to \"{name}\" failed: {source}")]
    CommandFailed {
        name: String,
        #[source]
        source: SessionError,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}
