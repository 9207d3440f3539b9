//! Per-output light state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowest (warmest) color temperature a KiLight output accepts, in Kelvin
pub const MIN_COLOR_TEMP: u16 = 2700;

/// Highest (coolest) color temperature a KiLight output accepts, in Kelvin
pub const MAX_COLOR_TEMP: u16 = 6500;

/// Clamp a Kelvin value to what the hardware accepts
pub fn clamp_color_temp(kelvin: u16) -> u16 {
    kelvin.clamp(MIN_COLOR_TEMP, MAX_COLOR_TEMP)
}

/// One of the independently controllable light channels of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OutputId {
    OutputA,
    OutputB,
}

impl OutputId {
    /// Every output a device can have, in display order
    pub const ALL: [OutputId; 2] = [OutputId::OutputA, OutputId::OutputB];

    /// Single-letter label used in display names ("Output A Light")
    pub fn letter(self) -> char {
        match self {
            OutputId::OutputA => 'A',
            OutputId::OutputB => 'B',
        }
    }

    /// Protocol name of the output, used as a unique-id segment
    pub fn as_str(self) -> &'static str {
        match self {
            OutputId::OutputA => "OutputA",
            OutputId::OutputB => "OutputB",
        }
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Red, green, blue, cold white and warm white channel levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgbcw {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub cold_white: u8,
    pub warm_white: u8,
}

impl Rgbcw {
    pub const fn new(red: u8, green: u8, blue: u8, cold_white: u8, warm_white: u8) -> Self {
        Self {
            red,
            green,
            blue,
            cold_white,
            warm_white,
        }
    }

    /// Channel values as a tuple in (r, g, b, cw, ww) order
    pub fn as_tuple(&self) -> (u8, u8, u8, u8, u8) {
        (self.red, self.green, self.blue, self.cold_white, self.warm_white)
    }
}

impl From<(u8, u8, u8, u8, u8)> for Rgbcw {
    fn from((red, green, blue, cold_white, warm_white): (u8, u8, u8, u8, u8)) -> Self {
        Self::new(red, green, blue, cold_white, warm_white)
    }
}

/// A temperature reading in degrees Celsius
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Temperature(pub f64);

impl Temperature {
    pub fn from_celsius(celsius: f64) -> Self {
        Self(celsius)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }
}

/// State of a single light output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputState {
    /// Whether the output is switched on
    pub power_on: bool,
    /// Brightness on a 0-255 scale
    pub brightness: u8,
    /// Channel mix
    pub rgbcw: Rgbcw,
    /// Color temperature in Kelvin, within [`MIN_COLOR_TEMP`, `MAX_COLOR_TEMP`]
    pub color_temp: u16,
    /// Current draw in amperes
    pub current: f64,
    /// Temperature at the output, when the hardware has a sensor there
    pub temperature: Option<Temperature>,
}

impl Default for OutputState {
    fn default() -> Self {
        Self {
            power_on: false,
            brightness: 0,
            rgbcw: Rgbcw::default(),
            color_temp: MIN_COLOR_TEMP,
            current: 0.0,
            temperature: None,
        }
    }
}
