//! Per-host liveness state machine.
//!
//! Two states, edge-triggered transitions: the scheduler drives Up to
//! Down when a reply goes overdue, the reader drives Down to Up on a
//! matching reply. Actions fire only on a state change, except in
//! repeat-down mode which re-fires the down action on every qualifying
//! tick.

use crate::types::StartCondition;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Host reachability state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivenessState {
    /// Host is considered reachable
    Up,
    /// Host is considered unreachable
    Down,
}

impl fmt::Display for LivenessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LivenessState::Up => write!(f, "UP"),
            LivenessState::Down => write!(f, "DOWN"),
        }
    }
}

/// Liveness state plus the probe timestamps it is judged against
#[derive(Debug, Clone)]
pub struct Liveness {
    state: LivenessState,
    last_ping_sent: Option<Instant>,
    last_ping_received: Instant,
}

impl Liveness {
    /// Create the state machine in its configured start condition.
    ///
    /// `last_ping_received` starts at `now`, so the overdue clock begins
    /// running at startup even if the host never answers.
    pub fn new(start: StartCondition, now: Instant) -> Self {
        let state = match start {
            StartCondition::Up => LivenessState::Up,
            StartCondition::Down => LivenessState::Down,
        };

        Self {
            state,
            last_ping_sent: None,
            last_ping_received: now,
        }
    }

    /// Current state
    pub fn state(&self) -> LivenessState {
        self.state
    }

    /// When the last matching reply was received
    pub fn last_ping_received(&self) -> Instant {
        self.last_ping_received
    }

    /// When the last echo request went out, if any
    pub fn last_ping_sent(&self) -> Option<Instant> {
        self.last_ping_sent
    }

    /// Whether a new echo request is due. The first probe is due
    /// immediately.
    pub fn ping_due(&self, now: Instant, interval: Duration) -> bool {
        match self.last_ping_sent {
            Some(sent) => now.duration_since(sent) >= interval,
            None => true,
        }
    }

    /// Record a successful transmission.
    pub fn record_sent(&mut self, now: Instant) {
        self.last_ping_sent = Some(now);
    }

    /// Whether the host's reply is overdue.
    pub fn overdue(&self, now: Instant, max_delay: Duration) -> bool {
        now.duration_since(self.last_ping_received) > max_delay
    }

    /// Drive the machine to Down.
    ///
    /// Returns whether the down action fires: on the Up to Down edge,
    /// or on every call while already Down when `repeat` is set.
    pub fn mark_down(&mut self, repeat: bool) -> bool {
        let was_up = self.state == LivenessState::Up;
        self.state = LivenessState::Down;
        was_up || repeat
    }

    /// Record a matching reply and drive the machine to Up.
    ///
    /// `last_ping_received` never moves backwards. Returns whether the
    /// up action fires (Down to Up edge).
    pub fn record_reply(&mut self, now: Instant) -> bool {
        if now > self.last_ping_received {
            self.last_ping_received = now;
        }
        let was_down = self.state == LivenessState::Down;
        self.state = LivenessState::Up;
        was_down
    }
}
