//! HomeBridgr Core — shared errors and server configuration.

pub mod config;
pub mod error;

pub use config::{DataPaths, HomeBridgrConfig};
pub use error::{Error, Result};
