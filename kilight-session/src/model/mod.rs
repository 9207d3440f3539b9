//! Model types for kilight-session

mod identity;
mod output;
mod state;

pub use identity::DeviceIdentity;
pub use output::{
    clamp_color_temp, OutputId, OutputState, Rgbcw, Temperature, MAX_COLOR_TEMP, MIN_COLOR_TEMP,
};
pub use state::DeviceState;
