//! Client session - one adopted connection and its two loops.
//!
//! Once started, a session runs:
//! - a **delivery loop** that drains the mailbox to the peer in FIFO order and
//!   sends a liveness probe every `ping_period`;
//! - a **liveness loop** that reads from the peer under a rolling deadline,
//!   extended by every pong.
//!
//! Either loop failing asks the hub to forget the session. Eviction by the hub
//! (unregister or a full mailbox) stops both loops: the delivery loop sends a
//! close frame and closes the write half, the liveness loop drops the read
//! half. Frames still queued at that point are discarded.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::domain::foundation::ClientId;
use crate::domain::realtime::EncodedEnvelope;
use crate::ports::{FrameSink, FrameSource, InboundFrame, OutboundFrame, TransportError};

use super::hub::Hub;
use super::limits::SessionLimits;
use super::live_set::{EvictionSignal, SessionHandle};

/// How the delivery loop ended.
#[derive(Debug)]
pub enum DeliveryOutcome {
    /// The hub dropped the session; a close frame was attempted.
    Evicted,
    /// A write failed or timed out.
    Failed(TransportError),
}

/// How the liveness loop ended.
#[derive(Debug)]
pub enum LivenessOutcome {
    /// The hub dropped the session.
    Evicted,
    /// A read failed, timed out, or returned an oversized frame.
    Failed(TransportError),
}

/// Join handles for a started session's loops.
#[derive(Debug)]
pub struct SessionTasks {
    pub delivery: JoinHandle<DeliveryOutcome>,
    pub liveness: JoinHandle<LivenessOutcome>,
}

/// A connection adopted as a live client, not yet started.
pub struct ClientSession {
    id: ClientId,
    sink: Box<dyn FrameSink>,
    source: Box<dyn FrameSource>,
    limits: SessionLimits,
}

impl ClientSession {
    /// Wraps an adopted connection under a fresh identity.
    pub fn new(
        sink: Box<dyn FrameSink>,
        source: Box<dyn FrameSource>,
        limits: SessionLimits,
    ) -> Self {
        Self {
            id: ClientId::new(),
            sink,
            source,
            limits,
        }
    }

    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Registers the session with `hub` and spawns both loops.
    pub fn start(self, hub: &Hub) -> SessionTasks {
        let Self {
            id,
            sink,
            source,
            limits,
        } = self;

        let (handle, mailbox) = SessionHandle::open(id, limits.mailbox_capacity);
        hub.register(handle);

        let delivery = tokio::spawn(run_delivery(
            id,
            sink,
            mailbox.frames,
            mailbox.evicted.clone(),
            limits.clone(),
            hub.clone(),
        ));
        let liveness = tokio::spawn(run_liveness(
            id,
            source,
            mailbox.evicted,
            limits,
            hub.clone(),
        ));

        SessionTasks { delivery, liveness }
    }
}

async fn write_frame(
    sink: &mut dyn FrameSink,
    frame: OutboundFrame,
    write_wait: Duration,
) -> Result<(), TransportError> {
    match time::timeout(write_wait, sink.send(frame)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::DeadlineExceeded {
            operation: "write",
            after: write_wait,
        }),
    }
}

/// Writes one frame unless the session is evicted first. A write stuck on a
/// dead peer is abandoned as soon as the hub drops the session.
async fn deliver(
    sink: &mut dyn FrameSink,
    frame: OutboundFrame,
    write_wait: Duration,
    eviction: &mut EvictionSignal,
) -> Result<(), DeliveryOutcome> {
    tokio::select! {
        biased;
        () = eviction.evicted() => Err(DeliveryOutcome::Evicted),
        written = write_frame(sink, frame, write_wait) => written.map_err(DeliveryOutcome::Failed),
    }
}

async fn run_delivery(
    id: ClientId,
    mut sink: Box<dyn FrameSink>,
    mut frames: mpsc::Receiver<EncodedEnvelope>,
    mut eviction: EvictionSignal,
    limits: SessionLimits,
    hub: Hub,
) -> DeliveryOutcome {
    // First probe goes out one full period after adoption
    let mut probe = time::interval_at(Instant::now() + limits.ping_period, limits.ping_period);
    probe.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = loop {
        tokio::select! {
            biased;
            () = eviction.evicted() => break DeliveryOutcome::Evicted,
            next = frames.recv() => match next {
                Some(envelope) => {
                    let frame = OutboundFrame::Text(envelope);
                    if let Err(ended) = deliver(sink.as_mut(), frame, limits.write_wait, &mut eviction).await {
                        break ended;
                    }
                }
                None => break DeliveryOutcome::Evicted,
            },
            _ = probe.tick() => {
                if let Err(ended) = deliver(sink.as_mut(), OutboundFrame::Ping, limits.write_wait, &mut eviction).await {
                    break ended;
                }
            }
        }
    };

    match &outcome {
        DeliveryOutcome::Evicted => {
            if let Err(e) = write_frame(sink.as_mut(), OutboundFrame::Close, limits.write_wait).await {
                debug!(client_id = %id, error = %e, "Close frame not delivered");
            }
        }
        DeliveryOutcome::Failed(e) => {
            warn!(client_id = %id, error = %e, "Delivery failed, dropping client");
            hub.unregister(id);
        }
    }

    match time::timeout(limits.write_wait, sink.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => debug!(client_id = %id, error = %e, "Error closing connection"),
        Err(_) => debug!(client_id = %id, "Timed out closing connection"),
    }

    outcome
}

async fn run_liveness(
    id: ClientId,
    mut source: Box<dyn FrameSource>,
    mut eviction: EvictionSignal,
    limits: SessionLimits,
    hub: Hub,
) -> LivenessOutcome {
    let mut deadline = Instant::now() + limits.pong_wait;

    let outcome = loop {
        tokio::select! {
            biased;
            () = eviction.evicted() => break LivenessOutcome::Evicted,
            read = time::timeout_at(deadline, source.next_frame()) => match read {
                Err(_) => {
                    break LivenessOutcome::Failed(TransportError::DeadlineExceeded {
                        operation: "read",
                        after: limits.pong_wait,
                    });
                }
                Ok(Err(e)) => break LivenessOutcome::Failed(e),
                Ok(Ok(InboundFrame::Pong)) => {
                    deadline = Instant::now() + limits.pong_wait;
                }
                Ok(Ok(InboundFrame::Data { len })) if len > limits.max_inbound_frame_bytes => {
                    break LivenessOutcome::Failed(TransportError::FrameTooLarge {
                        len,
                        limit: limits.max_inbound_frame_bytes,
                    });
                }
                Ok(Ok(_)) => {}
            },
        }
    };

    match &outcome {
        LivenessOutcome::Evicted => debug!(client_id = %id, "Liveness watch ended by eviction"),
        LivenessOutcome::Failed(e) => debug!(client_id = %id, error = %e, "Peer is gone"),
    }
    hub.unregister(id);

    outcome
}
