//! Reply reading: drain ready sockets and correlate echo replies.
//!
//! Raw ICMP sockets deliver a copy of every inbound ICMP datagram, so
//! each message must be matched against the process-wide identifier and
//! the owning host's sequence tag. Everything else is protocol noise
//! and is discarded at debug level.

use crate::actions::ActionRunner;
use crate::registry::{HostRecord, HostRegistry};
use icmp::EchoPacket;
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Drain every host socket and apply matching replies.
pub(crate) async fn drain_replies(
    registry: &mut HostRegistry,
    runner: &Arc<dyn ActionRunner>,
    ident: u16,
) {
    for record in registry.iter_mut() {
        loop {
            match record.socket.try_recv() {
                Ok(Some(packet)) => {
                    apply_packet(record, &packet, ident, runner, Instant::now()).await;
                }
                Ok(None) => break,
                Err(e) if e.kind() == ErrorKind::InvalidData => {
                    debug!(host = %record.name, error = %e, "discarding malformed datagram");
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => break,
                Err(e) => {
                    warn!(host = %record.name, error = %e, "error reading ICMP data");
                    break;
                }
            }
        }
    }
}

/// Apply one inbound message to its host record.
async fn apply_packet(
    record: &mut HostRecord,
    packet: &EchoPacket,
    ident: u16,
    runner: &Arc<dyn ActionRunner>,
    now: Instant,
) {
    if !matches_host(packet, ident, record.seq) {
        debug!(
            host = %record.name,
            icmp_type = packet.icmp_type,
            ident = packet.ident,
            seq = packet.seq,
            "discarding unrelated ICMP message"
        );
        return;
    }

    record.recvd_packets += 1;

    match packet.rtt() {
        Some(rtt) => debug!(
            host = %record.name,
            rtt_ms = rtt.as_millis() as u64,
            received = record.recvd_packets,
            "got echo reply"
        ),
        None => debug!(
            host = %record.name,
            received = record.recvd_packets,
            "got echo reply"
        ),
    }

    if record.liveness.record_reply(now) {
        info!(host = %record.name, "host is up, executing up command");
        runner.run(&record.name, &record.up_command).await;
    }
}

/// Whether an inbound message is the echo reply belonging to the host
/// carrying correlation tag `seq`.
pub fn matches_host(packet: &EchoPacket, ident: u16, seq: u16) -> bool {
    packet.is_echo_reply() && packet.ident == ident && packet.seq == seq
}

#[cfg(test)]
mod tests {
    use super::*;
    use icmp::{ICMP_ECHO_REPLY, ICMP_ECHO_REQUEST};

    fn reply(ident: u16, seq: u16) -> EchoPacket {
        let mut packet = EchoPacket::request(ident, seq);
        packet.icmp_type = ICMP_ECHO_REPLY;
        packet
    }

    #[test]
    fn test_matching_reply() {
        assert!(matches_host(&reply(0x1111, 4), 0x1111, 4));
    }

    #[test]
    fn test_mismatched_identifier_rejected() {
        assert!(!matches_host(&reply(0x2222, 4), 0x1111, 4));
    }

    #[test]
    fn test_mismatched_sequence_rejected() {
        assert!(!matches_host(&reply(0x1111, 5), 0x1111, 4));
    }

    #[test]
    fn test_echo_request_rejected() {
        // Our own outbound requests looped back must never count.
        let request = EchoPacket::request(0x1111, 4);
        assert_eq!(request.icmp_type, ICMP_ECHO_REQUEST);
        assert!(!matches_host(&request, 0x1111, 4));
    }
}
