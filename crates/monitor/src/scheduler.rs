//! Probe scheduling: the periodic pass over the host registry.
//!
//! Once per tick every host is inspected in registry order: first for an
//! overdue reply (driving the Up to Down transition), then for a due
//! echo request. The tick period is the registry's interval GCD, so a
//! host never misses its nominal schedule.

use crate::actions::ActionRunner;
use crate::registry::HostRegistry;
use crate::types::MonitorOptions;
use icmp::EchoPacket;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One full scheduler pass over the registry.
///
/// The caller runs this on a single task, so the pass is atomic with
/// respect to the reply reader.
pub(crate) async fn tick_pass(
    registry: &mut HostRegistry,
    runner: &Arc<dyn ActionRunner>,
    options: &MonitorOptions,
    ident: u16,
    now: Instant,
) {
    for record in registry.iter_mut() {
        if record.liveness.overdue(now, record.max_delay)
            && record.liveness.mark_down(options.repeat_down_command)
        {
            info!(host = %record.name, "host is down, executing down command");
            runner.run(&record.name, &record.down_command).await;
        }

        if record.liveness.ping_due(now, record.ping_interval) {
            let packet = EchoPacket::request(ident, record.seq);
            match record.socket.send(&packet) {
                Ok(_) => {
                    record.sent_packets += 1;
                    record.liveness.record_sent(now);
                    debug!(
                        host = %record.name,
                        seq = record.seq,
                        sent = record.sent_packets,
                        "sent echo request"
                    );
                }
                Err(e) => {
                    // Left for the next tick; no retry here.
                    warn!(host = %record.name, error = %e, "failed to send echo request");
                }
            }
        }
    }
}
