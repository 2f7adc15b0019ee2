//! Timing and capacity limits for live sessions.

use std::time::Duration;

/// Frames a session mailbox holds before the session counts as stalled.
pub const MAILBOX_CAPACITY: usize = 128;

/// Broadcasts the hub intake absorbs while its loop is busy.
pub const BROADCAST_BUFFER: usize = 128;

/// Upper bound on a single write to the peer.
pub const WRITE_WAIT: Duration = Duration::from_secs(10);

/// How long a peer may stay silent (no pong) before it is considered dead.
pub const PONG_WAIT: Duration = Duration::from_secs(60);

/// Probe interval, always shorter than [`PONG_WAIT`].
pub const PING_PERIOD: Duration = Duration::from_secs(54);

/// Largest inbound frame accepted. Peers send no application payloads.
pub const MAX_INBOUND_FRAME_BYTES: usize = 1024;

/// Probe interval for a given liveness window: 9/10 of it, so a probe always
/// goes out before the window closes.
pub fn probe_interval(pong_wait: Duration) -> Duration {
    pong_wait * 9 / 10
}

/// Per-session limits shared by the delivery and liveness loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLimits {
    pub mailbox_capacity: usize,
    pub write_wait: Duration,
    pub pong_wait: Duration,
    pub ping_period: Duration,
    pub max_inbound_frame_bytes: usize,
}

impl SessionLimits {
    /// Limits with a custom liveness window; the probe interval follows it.
    pub fn with_pong_wait(pong_wait: Duration) -> Self {
        Self {
            pong_wait,
            ping_period: probe_interval(pong_wait),
            ..Self::default()
        }
    }
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            mailbox_capacity: MAILBOX_CAPACITY,
            write_wait: WRITE_WAIT,
            pong_wait: PONG_WAIT,
            ping_period: PING_PERIOD,
            max_inbound_frame_bytes: MAX_INBOUND_FRAME_BYTES,
        }
    }
}

/// Settings for constructing a hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    pub broadcast_buffer: usize,
    pub session: SessionLimits,
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            broadcast_buffer: BROADCAST_BUFFER,
            session: SessionLimits::default(),
        }
    }
}
