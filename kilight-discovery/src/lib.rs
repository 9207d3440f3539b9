//! KiLight device discovery
//!
//! Turns zeroconf advertisements into a deduplicated list of devices the user
//! can pick from, and accepts a pick only after a live connectivity probe.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use kilight_discovery::{DiscoveryFlow, FlowResult};
//!
//! let mut flow = DiscoveryFlow::new(connector, configured_hardware_ids);
//! for ad in advertisements {
//!     // IPv6, anonymous and already-configured devices are skipped
//!     let _ = flow.add_advertisement(&ad);
//! }
//!
//! match flow.step_user(None).await {
//!     FlowResult::Form(form) => show(form),
//!     FlowResult::Created(entry) => save(entry),
//!     FlowResult::Aborted(reason) => println!("{}", reason),
//! }
//! ```
//!
//! Devices are keyed by the `hwid` TXT property, never by address: a device
//! that re-advertises from a new address replaces its earlier candidate.

mod advertisement;
mod candidates;
mod error;
pub mod flow;

pub use advertisement::{Advertisement, HARDWARE_ID_PROPERTY};
pub use candidates::{Candidate, CandidateSet};
pub use error::{AbortReason, FormError};
pub use flow::{
    CreatedEntry, DiscoveryFlow, FlowConfig, FlowResult, FlowState, Form, SelectOption,
    BASE_ERROR, DEFAULT_PROBE_TIMEOUT, USER_STEP,
};
