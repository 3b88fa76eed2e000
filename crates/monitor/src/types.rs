//! Monitoring configuration types.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one monitored host, supplied by the config loader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Hostname or IPv4 literal
    pub host: String,

    /// Interval between echo requests
    #[serde(with = "humantime_serde")]
    pub ping_interval: Duration,

    /// How long a host may go without a reply before it is considered down
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,

    /// Command to run when the host comes up
    pub up_command: String,

    /// Command to run when the host goes down
    pub down_command: String,

    /// Assumed state at startup
    #[serde(default)]
    pub start_condition: StartCondition,
}

/// Assumed liveness state before the first probe settles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartCondition {
    /// Treat the host as reachable until a reply goes overdue
    #[default]
    Up,

    /// Treat the host as unreachable until the first reply arrives
    Down,
}

/// Global monitoring options, supplied by CLI parsing
#[derive(Debug, Clone, Copy, Default)]
pub struct MonitorOptions {
    /// Re-run the down command on every tick while a host stays down,
    /// instead of only on the Up to Down transition
    pub repeat_down_command: bool,
}
