//! In-memory connection for testing.
//!
//! Implements [`FrameSink`] and [`FrameSource`] over channels so session loops
//! can be exercised without sockets. The test holds the [`RemotePeer`] end:
//! it sees every frame the session writes and injects frames the session reads.
//!
//! # Example
//!
//! ```ignore
//! let (sink, source, mut peer) = in_memory_connection();
//! let session = ClientSession::new(Box::new(sink), Box::new(source), limits);
//! session.start(&hub);
//!
//! assert!(matches!(peer.outbound.recv().await, Some(OutboundFrame::Text(_))));
//! peer.inbound.send(InboundFrame::Pong).unwrap();
//! ```

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ports::{FrameSink, FrameSource, InboundFrame, OutboundFrame, TransportError};

/// Write half backed by a channel.
pub struct InMemoryFrameSink {
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    closed: bool,
}

/// Read half backed by a channel.
pub struct InMemoryFrameSource {
    inbound: mpsc::UnboundedReceiver<InboundFrame>,
}

/// The remote end of an in-memory connection.
pub struct RemotePeer {
    /// Frames written by the session, in order.
    pub outbound: mpsc::UnboundedReceiver<OutboundFrame>,
    /// Frames the session will read. Dropping it looks like the peer hanging up.
    pub inbound: mpsc::UnboundedSender<InboundFrame>,
}

/// Creates a connected sink/source pair and the peer end that observes it.
pub fn in_memory_connection() -> (InMemoryFrameSink, InMemoryFrameSource, RemotePeer) {
    let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    (
        InMemoryFrameSink {
            outbound: outbound_tx,
            closed: false,
        },
        InMemoryFrameSource {
            inbound: inbound_rx,
        },
        RemotePeer {
            outbound: outbound_rx,
            inbound: inbound_tx,
        },
    )
}

#[async_trait]
impl FrameSink for InMemoryFrameSink {
    async fn send(&mut self, frame: OutboundFrame) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.outbound.send(frame).map_err(|_| TransportError::Closed)
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        self.closed = true;
        Ok(())
    }
}

#[async_trait]
impl FrameSource for InMemoryFrameSource {
    async fn next_frame(&mut self) -> Result<InboundFrame, TransportError> {
        self.inbound.recv().await.ok_or(TransportError::Closed)
    }
}
