//! Host registry: one monitoring record per resolvable host.
//!
//! Populated once at startup. Hosts that fail resolution or socket
//! setup are dropped permanently; nothing is ever added afterwards.

use crate::liveness::Liveness;
use crate::types::HostConfig;
use common::{Error, Result};
use icmp::IcmpSocket;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// One monitored host and everything needed to probe it
pub struct HostRecord {
    /// Hostname or IP literal from the configuration
    pub name: String,

    /// Address resolved once at startup
    pub addr: Ipv4Addr,

    /// Raw ICMP socket owned exclusively by this host
    pub socket: IcmpSocket,

    /// Per-host correlation tag carried in the echo sequence field
    pub seq: u16,

    /// Interval between echo requests
    pub ping_interval: Duration,

    /// How long a reply may be missing before the host is down
    pub max_delay: Duration,

    /// Command to run on the Down to Up transition
    pub up_command: String,

    /// Command to run on the Up to Down transition
    pub down_command: String,

    /// Liveness state machine
    pub liveness: Liveness,

    /// Echo requests transmitted
    pub sent_packets: u64,

    /// Matching replies received
    pub recvd_packets: u64,
}

/// Ordered collection of host records, shared by scheduler and reader
pub struct HostRegistry {
    records: Vec<HostRecord>,
}

impl HostRegistry {
    /// Resolve every configured host and open its raw socket.
    ///
    /// A host that cannot be resolved or whose socket cannot be created
    /// is dropped with a warning; startup fails only when no host is
    /// left.
    pub async fn init(configs: &[HostConfig]) -> Result<Self> {
        let mut records = Vec::with_capacity(configs.len());

        for config in configs {
            debug!(host = %config.host, "resolving host");

            let addr = match resolve(&config.host).await {
                Ok(addr) => {
                    debug!(host = %config.host, %addr, "host resolved");
                    addr
                }
                Err(e) => {
                    warn!(host = %config.host, error = %e, "cannot resolve host, skipping");
                    continue;
                }
            };

            let socket = match IcmpSocket::new(addr) {
                Ok(socket) => socket,
                Err(e) => {
                    warn!(host = %config.host, error = %e, "cannot create socket, skipping");
                    continue;
                }
            };

            let seq = records.len() as u16;
            records.push(HostRecord {
                name: config.host.clone(),
                addr,
                socket,
                seq,
                ping_interval: config.ping_interval,
                max_delay: config.max_delay,
                up_command: config.up_command.clone(),
                down_command: config.down_command.clone(),
                liveness: Liveness::new(config.start_condition, Instant::now()),
                sent_packets: 0,
                recvd_packets: 0,
            });
        }

        if records.is_empty() {
            return Err(Error::monitor("no hosts left to monitor"));
        }

        debug!(hosts = records.len(), "host registry initialized");
        Ok(Self { records })
    }

    /// Number of monitored hosts
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in registry (insertion) order.
    pub fn iter(&self) -> impl Iterator<Item = &HostRecord> {
        self.records.iter()
    }

    /// Iterate records mutably in registry (insertion) order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut HostRecord> {
        self.records.iter_mut()
    }

    /// Scheduler tick period: the greatest common divisor of all
    /// configured intervals, so no per-host schedule drifts.
    pub fn tick_interval(&self) -> Duration {
        let secs = self
            .records
            .iter()
            .map(|r| r.ping_interval.as_secs().max(1))
            .reduce(gcd)
            .unwrap_or(1);

        Duration::from_secs(secs)
    }
}

/// Resolve a hostname or IPv4 literal to an address, once.
async fn resolve(name: &str) -> Result<Ipv4Addr> {
    if let Ok(addr) = name.parse::<Ipv4Addr>() {
        return Ok(addr);
    }

    let addrs = tokio::net::lookup_host(format!("{name}:0"))
        .await
        .map_err(|e| Error::resolve(format!("{name}: {e}")))?;

    addrs
        .into_iter()
        .find_map(|addr| match addr.ip() {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| Error::resolve(format!("{name}: no IPv4 address")))
}

fn gcd(x: u64, y: u64) -> u64 {
    let (mut x, mut y) = (x, y);
    while y != 0 {
        let rem = x % y;
        x = y;
        y = rem;
    }
    x
}
