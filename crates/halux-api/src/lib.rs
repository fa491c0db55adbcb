//! halux-api: Shared wire types
//!
//! MQTT address scheme, Home Assistant discovery descriptors and status
//! payloads published by the bridge.

pub mod discovery;
pub mod status;
pub mod topics;

pub use discovery::{
    BinarySensorDiscovery, ButtonDiscovery, DeviceInfo, SelectDiscovery, title_case,
};
pub use status::{BROKEN, IDLE, ProblemStatus};
pub use topics::{RESERVED_STATE_NAMES, Topics};
