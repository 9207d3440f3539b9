//! Light commands
//!
//! A [`LightIntent`] is what the user asked for; [`project`] turns it into the
//! single [`OutputWrite`] sent to the device. Any turn-on, including one that
//! only sets brightness or color, also switches the output on.
//!
//! Commands never touch local state. The display changes when the device
//! pushes its new state or the next poll picks it up.

use kilight_session::{clamp_color_temp, OutputId, OutputWrite, Rgbcw, SessionError};
use tokio::time::timeout;
use tracing::debug;

use crate::context::DeviceContext;
use crate::entity::ColorMode;
use crate::SdkError;

/// A user request for one light output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightIntent {
    TurnOn {
        brightness: Option<u8>,
        rgbww: Option<Rgbcw>,
        color_temp_kelvin: Option<u16>,
    },
    TurnOff,
}

impl LightIntent {
    /// Plain turn-on, keeping brightness and color
    pub fn turn_on() -> Self {
        LightIntent::TurnOn {
            brightness: None,
            rgbww: None,
            color_temp_kelvin: None,
        }
    }

    pub fn set_brightness(brightness: u8) -> Self {
        Self::turn_on().with_brightness(brightness)
    }

    pub fn set_rgbww(color: Rgbcw) -> Self {
        Self::turn_on().with_rgbww(color)
    }

    pub fn set_color_temp(kelvin: u16) -> Self {
        Self::turn_on().with_color_temp(kelvin)
    }

    /// Add a brightness to a turn-on; a turn-off is returned unchanged
    pub fn with_brightness(self, value: u8) -> Self {
        match self {
            LightIntent::TurnOn {
                rgbww,
                color_temp_kelvin,
                ..
            } => LightIntent::TurnOn {
                brightness: Some(value),
                rgbww,
                color_temp_kelvin,
            },
            LightIntent::TurnOff => self,
        }
    }

    pub fn with_rgbww(self, color: Rgbcw) -> Self {
        match self {
            LightIntent::TurnOn {
                brightness,
                color_temp_kelvin,
                ..
            } => LightIntent::TurnOn {
                brightness,
                rgbww: Some(color),
                color_temp_kelvin,
            },
            LightIntent::TurnOff => self,
        }
    }

    pub fn with_color_temp(self, kelvin: u16) -> Self {
        match self {
            LightIntent::TurnOn { brightness, rgbww, .. } => LightIntent::TurnOn {
                brightness,
                rgbww,
                color_temp_kelvin: Some(kelvin),
            },
            LightIntent::TurnOff => self,
        }
    }
}

/// Device write for an intent, plus the color mode it puts the light in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub write: OutputWrite,
    /// `None` when the intent does not change the color mode
    pub color_mode: Option<ColorMode>,
}

/// Map an intent to one device write
///
/// An RGBWW color wins over a color temperature given in the same intent.
/// Color temperatures are clamped to what the hardware accepts.
pub fn project(intent: &LightIntent) -> Projection {
    match *intent {
        LightIntent::TurnOff => Projection {
            write: OutputWrite::new().power_on(false),
            color_mode: None,
        },
        LightIntent::TurnOn {
            brightness,
            rgbww,
            color_temp_kelvin,
        } => {
            let mut write = OutputWrite::new();
            let mut color_mode = None;

            if let Some(brightness) = brightness {
                write = write.brightness(brightness);
            }

            if let Some(color) = rgbww {
                write = write.rgbcw(color);
                color_mode = Some(ColorMode::Rgbww);
            } else if let Some(kelvin) = color_temp_kelvin {
                write = write.color_temp(clamp_color_temp(kelvin));
                color_mode = Some(ColorMode::ColorTemp);
            }

            Projection {
                write: write.power_on(true),
                color_mode,
            }
        }
    }
}

/// Send an intent to one output and wait for the write to complete
pub(crate) async fn execute(
    context: &DeviceContext,
    output: OutputId,
    intent: &LightIntent,
) -> Result<Option<ColorMode>, SdkError> {
    let Projection { write, color_mode } = project(intent);
    let limit = context.coordinator.config().device_timeout;

    debug!(device = %context.title, %output, ?write, "Writing output");

    let result = match timeout(limit, context.session.write_output(output, write)).await {
        Ok(result) => result,
        Err(_) => Err(SessionError::NetworkTimeout(format!(
            "write not acknowledged within {:?}",
            limit
        ))),
    };

    result.map(|()| color_mode).map_err(|source| SdkError::CommandFailed {
        name: context.session.name(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brightness_implies_power_on() {
        let projection = project(&LightIntent::set_brightness(128));
        assert_eq!(projection.write, OutputWrite::new().brightness(128).power_on(true));
        assert_eq!(projection.color_mode, None);
    }

    #[test]
    fn test_turn_off_only_powers_off() {
        let projection = project(&LightIntent::TurnOff.with_brightness(10));
        assert_eq!(projection.write, OutputWrite::new().power_on(false));
    }

    #[test]
    fn test_rgbww_wins_over_color_temp() {
        let color = Rgbcw::new(255, 0, 0, 0, 0);
        let projection = project(&LightIntent::set_color_temp(3000).with_rgbww(color));
        assert_eq!(projection.write.rgbcw, Some(color));
        assert_eq!(projection.write.color_temp, None);
        assert_eq!(projection.color_mode, Some(ColorMode::Rgbww));
    }

    #[test]
    fn test_color_temp_is_clamped() {
        let projection = project(&LightIntent::set_color_temp(1500));
        assert_eq!(projection.write.color_temp, Some(kilight_session::MIN_COLOR_TEMP));
        assert_eq!(projection.color_mode, Some(ColorMode::ColorTemp));
    }
}
