//! Common utilities and types shared across the icmpmonitor crates.

pub mod error;
pub mod logging;

pub use error::{Error, Result};
