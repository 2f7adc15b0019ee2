//! Live connection ports - the two halves of an adopted connection.
//!
//! A client session runs its delivery loop and its liveness loop concurrently,
//! so the connection is handed over already split: the delivery loop owns the
//! [`FrameSink`], the liveness loop owns the [`FrameSource`]. Protocol upgrade
//! and framing live in the adapter; sessions only see the frames below.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::realtime::EncodedEnvelope;

/// Frames a session writes to its peer.
#[derive(Debug, Clone)]
pub enum OutboundFrame {
    /// One complete application message carrying an envelope.
    Text(EncodedEnvelope),
    /// Transport-level liveness probe.
    Ping,
    /// Terminal close frame, sent when the hub evicts the session.
    Close,
}

/// Frames a session observes from its peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundFrame {
    /// Acknowledgment of a liveness probe.
    Pong,
    /// Probe initiated by the peer.
    Ping,
    /// Application data. Peers are not expected to send any; only the size
    /// is kept so oversized frames can be rejected.
    Data { len: usize },
}

/// Failures of the underlying connection.
///
/// Always confined to the one session that hit them.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection closed")]
    Closed,

    #[error("{operation} deadline of {after:?} exceeded")]
    DeadlineExceeded {
        operation: &'static str,
        after: Duration,
    },

    #[error("inbound frame of {len} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { len: usize, limit: usize },

    #[error("transport failure: {0}")]
    Io(String),
}

impl TransportError {
    pub fn io(err: impl std::fmt::Display) -> Self {
        TransportError::Io(err.to_string())
    }
}

/// Write half of an adopted connection.
#[async_trait]
pub trait FrameSink: Send + 'static {
    /// Writes one frame. Callers bound this with their own deadline.
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError>;

    /// Flushes and closes the write half.
    async fn close(&mut self) -> Result<(), TransportError>;
}

/// Read half of an adopted connection.
#[async_trait]
pub trait FrameSource: Send + 'static {
    /// Waits for the next frame.
    ///
    /// A close frame from the peer or the end of the stream is reported as
    /// [`TransportError::Closed`]. Implementations must be cancel safe: the
    /// liveness loop drops this future when the session is evicted.
    async fn next_frame(&mut self) -> Result<InboundFrame, TransportError>;
}
