//! Scenario tests for the liveness state machine and action plumbing.

use async_trait::async_trait;
use icmp::{EchoPacket, ICMP_ECHO_REPLY};
use monitor::reader::matches_host;
use monitor::{ActionRunner, Liveness, LivenessState, StartCondition};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Action runner that records every invocation
struct RecordingRunner {
    tx: mpsc::UnboundedSender<(String, String)>,
}

#[async_trait]
impl ActionRunner for RecordingRunner {
    async fn run(&self, host: &str, command: &str) {
        let _ = self.tx.send((host.to_string(), command.to_string()));
    }
}

fn recording_runner() -> (RecordingRunner, mpsc::UnboundedReceiver<(String, String)>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RecordingRunner { tx }, rx)
}

const SECOND: Duration = Duration::from_secs(1);

#[tokio::test]
async fn test_host_going_silent_fires_one_down_action() {
    // Host with a 2s interval and 10s max delay; no replies arrive for
    // 13 seconds of 1s ticks.
    let (runner, mut rx) = recording_runner();
    let t0 = Instant::now();
    let mut liveness = Liveness::new(StartCondition::Up, t0);
    let max_delay = Duration::from_secs(10);

    for tick in 1..=13u64 {
        let now = t0 + SECOND * tick as u32;
        if liveness.overdue(now, max_delay) && liveness.mark_down(false) {
            runner.run("gw", "ifdown wan0").await;
        }
    }

    // Exactly one invocation, at the first tick past the max delay.
    assert_eq!(
        rx.try_recv().unwrap(),
        ("gw".to_string(), "ifdown wan0".to_string())
    );
    assert!(rx.try_recv().is_err());
    assert_eq!(liveness.state(), LivenessState::Down);
}

#[tokio::test]
async fn test_repeat_mode_fires_per_qualifying_tick() {
    let (runner, mut rx) = recording_runner();
    let t0 = Instant::now();
    let mut liveness = Liveness::new(StartCondition::Up, t0);
    let max_delay = Duration::from_secs(10);

    for tick in 1..=13u64 {
        let now = t0 + SECOND * tick as u32;
        if liveness.overdue(now, max_delay) && liveness.mark_down(true) {
            runner.run("gw", "ifdown wan0").await;
        }
    }

    // Qualifying ticks: 11, 12, 13.
    let mut invocations = 0;
    while rx.try_recv().is_ok() {
        invocations += 1;
    }
    assert_eq!(invocations, 3);
}

#[tokio::test]
async fn test_down_host_single_reply_fires_one_up_action() {
    let (runner, mut rx) = recording_runner();
    let t0 = Instant::now();
    let mut liveness = Liveness::new(StartCondition::Down, t0);

    let ident = 0x4242;
    let mut reply = EchoPacket::request(ident, 1);
    reply.icmp_type = ICMP_ECHO_REPLY;

    if matches_host(&reply, ident, 1) && liveness.record_reply(t0 + SECOND) {
        runner.run("gw", "ifup wan0").await;
    }

    assert_eq!(liveness.state(), LivenessState::Up);
    assert_eq!(
        rx.try_recv().unwrap(),
        ("gw".to_string(), "ifup wan0".to_string())
    );
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_mismatched_reply_never_touches_state() {
    let (runner, mut rx) = recording_runner();
    let t0 = Instant::now();
    let mut liveness = Liveness::new(StartCondition::Down, t0);

    let mut reply = EchoPacket::request(0x4242, 1);
    reply.icmp_type = ICMP_ECHO_REPLY;

    let before = liveness.last_ping_received();
    for (ident, seq) in [(0x4242, 2), (0x9999, 1), (0x9999, 9)] {
        if matches_host(&reply, ident, seq) && liveness.record_reply(t0 + SECOND) {
            runner.run("gw", "ifup wan0").await;
        }
    }

    assert_eq!(liveness.state(), LivenessState::Down);
    assert_eq!(liveness.last_ping_received(), before);
    assert!(rx.try_recv().is_err());
}
