//! Common error types for the icmpmonitor crates.

use std::fmt;

/// A specialized Result type for monitoring operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for monitoring operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resolver error: {0}")]
    Resolve(String),

    #[error("Monitor error: {0}")]
    Monitor(String),
}

impl Error {
    /// Create a new resolver error.
    pub fn resolve(msg: impl fmt::Display) -> Self {
        Error::Resolve(msg.to_string())
    }

    /// Create a new monitor error.
    pub fn monitor(msg: impl fmt::Display) -> Self {
        Error::Monitor(msg.to_string())
    }
}
