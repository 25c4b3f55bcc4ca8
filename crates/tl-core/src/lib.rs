//! tl-core - Core library for Tideline
//!
//! This crate provides the types shared by every Tideline component:
//! project configuration, address builders for the source and database
//! drivers, migration payloads, the composite error and the throttled
//! reader used to exercise streaming consumers.

pub mod address;
pub mod config;
pub mod error;
pub mod multi_error;
pub mod payload;
pub mod steps;
pub mod throttle;

pub use address::{data_address, file_address, filter_custom_query, scheme_from_url};
pub use config::{Config, ConfigVersion, LockSettings};
pub use error::{CoreError, CoreResult};
pub use multi_error::MultiError;
pub use payload::{Direction, Payload, PayloadFormat};
pub use steps::Steps;
pub use throttle::ThrottledReader;
