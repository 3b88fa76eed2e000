//! ICMP host liveness monitoring core.
//!
//! Watches a fixed set of hosts via ICMP echo and runs operator-supplied
//! commands exactly when a host's reachability state transitions.
//!
//! # Components
//!
//! - [`registry`] - the per-host monitoring records, populated once at
//!   startup from resolved host configuration
//! - [`scheduler`] - the periodic pass that detects overdue hosts and
//!   transmits new echo requests
//! - [`reader`] - the bounded wait over all host sockets that correlates
//!   inbound replies
//! - [`liveness`] - the up/down state machine shared by scheduler and
//!   reader
//! - [`actions`] - the fire-and-forget command invocation seam
//!
//! # Example
//!
//! ```no_run
//! use monitor::{Monitor, MonitorOptions, ShellRunner};
//! use monitor::registry::HostRegistry;
//! use std::sync::Arc;
//!
//! # async fn example(configs: Vec<monitor::HostConfig>) -> common::Result<()> {
//! let registry = HostRegistry::init(&configs).await?;
//! let monitor = Monitor::new(registry, Arc::new(ShellRunner), MonitorOptions::default());
//!
//! // Runs until the process is signalled (requires CAP_NET_RAW)
//! monitor.run().await;
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod liveness;
pub mod monitor;
pub mod reader;
pub mod registry;
pub mod scheduler;
pub mod types;

pub use actions::{ActionRunner, ShellRunner};
pub use liveness::{Liveness, LivenessState};
pub use monitor::Monitor;
pub use registry::{HostRecord, HostRegistry};
pub use types::{HostConfig, MonitorOptions, StartCondition};
