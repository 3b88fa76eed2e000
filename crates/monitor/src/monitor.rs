//! The monitor loop tying scheduler and reader together.

use crate::actions::ActionRunner;
use crate::reader;
use crate::registry::HostRegistry;
use crate::scheduler;
use crate::types::MonitorOptions;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior, interval};
use tracing::info;

/// Poll cadence for draining reply sockets between scheduler ticks.
/// Bounds the reader's wait so overdue detection is never starved.
const RECV_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Drives the probe scheduler and reply reader over one host registry
pub struct Monitor {
    registry: HostRegistry,
    runner: Arc<dyn ActionRunner>,
    options: MonitorOptions,
    ident: u16,
}

impl Monitor {
    /// Create a new monitor.
    ///
    /// The echo identifier is the process id masked to 16 bits; replies
    /// from other ping processes on the machine never correlate.
    pub fn new(
        registry: HostRegistry,
        runner: Arc<dyn ActionRunner>,
        options: MonitorOptions,
    ) -> Self {
        Self {
            registry,
            runner,
            options,
            ident: std::process::id() as u16,
        }
    }

    /// Run the scheduler and reader until the process is signalled.
    ///
    /// One task owns the registry and alternates full scheduler passes
    /// with reply drains, so the reader never observes a host
    /// mid-transition and every mutable field has a single writer at a
    /// time.
    pub async fn run(mut self) {
        let tick = self.registry.tick_interval();
        info!(
            hosts = self.registry.len(),
            tick_secs = tick.as_secs(),
            "monitor started"
        );

        let mut ticker = interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        ticker.tick().await; // Skip first immediate tick

        let mut recv_poll = interval(RECV_POLL_INTERVAL);
        recv_poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    scheduler::tick_pass(
                        &mut self.registry,
                        &self.runner,
                        &self.options,
                        self.ident,
                        Instant::now(),
                    )
                    .await;
                }
                _ = recv_poll.tick() => {
                    reader::drain_replies(&mut self.registry, &self.runner, self.ident).await;
                }
            }
        }
    }
}
