//! Hub - single owner of the live-session set.
//!
//! The hub follows the actor pattern: cloneable [`Hub`] handles send
//! [`HubCommand`]s down one FIFO queue and one [`HubLoop`] task drains it,
//! mutating the [`LiveSet`] it alone owns. Registrations, removals and
//! broadcasts are applied in the order the calls were made, so a session
//! registered after a broadcast call returns never receives that broadcast.
//!
//! ```text
//!   adoption path ──Register───┐
//!   liveness loops ─Unregister─┼──▶ HubLoop ──try_send──▶ session mailboxes
//!   write path ─────Broadcast──┘     (LiveSet)
//! ```
//!
//! Broadcasts hold one of `broadcast_buffer` permits while queued, which
//! bounds how many can wait behind a busy loop.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, info, warn};

use crate::domain::foundation::ClientId;
use crate::domain::realtime::{EncodedEnvelope, EventType, PostSummary};
use crate::ports::EventBroadcaster;

use super::limits::{HubSettings, SessionLimits};
use super::live_set::{LiveSet, SessionHandle};

/// Commands processed by the hub loop, in arrival order.
#[derive(Debug)]
pub enum HubCommand {
    /// Admit a session into the live set.
    Register(SessionHandle),
    /// Remove a session; absent sessions are ignored.
    Unregister(ClientId),
    /// Fan an encoded envelope out to every live session.
    Broadcast {
        frame: EncodedEnvelope,
        /// Intake slot, released once the fan-out is done.
        _permit: OwnedSemaphorePermit,
    },
}

/// Cloneable handle to the hub.
///
/// Every method is non-blocking. Handles are cheap to clone and are passed to
/// the adoption path, to each session's loops and to the write path.
#[derive(Debug, Clone)]
pub struct Hub {
    commands: mpsc::UnboundedSender<HubCommand>,
    broadcast_slots: Arc<Semaphore>,
    live_count: Arc<AtomicUsize>,
    session_limits: SessionLimits,
}

/// The coordinating loop. Owns the live set.
#[derive(Debug)]
pub struct HubLoop {
    commands: mpsc::UnboundedReceiver<HubCommand>,
    live: LiveSet,
    live_count: Arc<AtomicUsize>,
}

impl Hub {
    /// Creates a hub handle and its loop without starting the loop.
    pub fn new(settings: HubSettings) -> (Self, HubLoop) {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let live_count = Arc::new(AtomicUsize::new(0));

        let hub = Self {
            commands: commands_tx,
            broadcast_slots: Arc::new(Semaphore::new(settings.broadcast_buffer)),
            live_count: Arc::clone(&live_count),
            session_limits: settings.session,
        };
        let hub_loop = HubLoop {
            commands: commands_rx,
            live: LiveSet::new(),
            live_count,
        };
        (hub, hub_loop)
    }

    /// Creates a hub and spawns its loop on the current runtime.
    pub fn spawn(settings: HubSettings) -> Self {
        let (hub, hub_loop) = Self::new(settings);
        tokio::spawn(hub_loop.run());
        hub
    }

    /// Queues a session for admission into the live set.
    pub fn register(&self, handle: SessionHandle) {
        let id = handle.id();
        if self.commands.send(HubCommand::Register(handle)).is_err() {
            debug!(client_id = %id, "Hub loop stopped, registration dropped");
        }
    }

    /// Queues removal of a session. Removing an absent session is a no-op.
    pub fn unregister(&self, id: ClientId) {
        if self.commands.send(HubCommand::Unregister(id)).is_err() {
            debug!(client_id = %id, "Hub loop stopped, unregistration dropped");
        }
    }

    /// Encodes `data` once and queues it for delivery to every live session.
    ///
    /// Never blocks and never fails the caller. An encoding failure or a full
    /// intake drops this one broadcast and is logged.
    pub fn broadcast<T>(&self, event_type: EventType, data: &T)
    where
        T: Serialize + ?Sized,
    {
        let frame = match EncodedEnvelope::encode(event_type, data) {
            Ok(frame) => frame,
            Err(e) => {
                error!(error = %e, "Dropping broadcast: envelope encoding failed");
                return;
            }
        };

        let permit = match Arc::clone(&self.broadcast_slots).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!(
                    event_type = %frame.event_type(),
                    "Broadcast intake full, dropping event"
                );
                return;
            }
        };

        let event_type = frame.event_type().clone();
        let command = HubCommand::Broadcast {
            frame,
            _permit: permit,
        };
        if self.commands.send(command).is_err() {
            debug!(event_type = %event_type, "Hub loop stopped, broadcast dropped");
        }
    }

    /// Announces a newly created post to every live client.
    pub fn broadcast_post_created(&self, post: &PostSummary) {
        self.broadcast(EventType::POST_CREATED, post);
    }

    /// Size of the live set as of the loop's last completed unit of work.
    pub fn live_count(&self) -> usize {
        self.live_count.load(Ordering::Relaxed)
    }

    /// Limits applied to sessions adopted through this hub.
    pub fn session_limits(&self) -> &SessionLimits {
        &self.session_limits
    }
}

impl EventBroadcaster for Hub {
    fn broadcast_post_created(&self, post: &PostSummary) {
        Hub::broadcast_post_created(self, post);
    }
}

impl HubLoop {
    /// Runs until every [`Hub`] handle has been dropped.
    ///
    /// Each command is handled by an infallible method, so no single
    /// registration, removal or broadcast can end the loop.
    pub async fn run(mut self) {
        info!("Realtime hub starting");

        while let Some(command) = self.commands.recv().await {
            match command {
                HubCommand::Register(handle) => self.handle_register(handle),
                HubCommand::Unregister(id) => self.handle_unregister(id),
                HubCommand::Broadcast { frame, .. } => self.handle_broadcast(frame),
            }
            self.live_count.store(self.live.len(), Ordering::Relaxed);
        }

        if self.live.is_empty() {
            info!("Realtime hub stopped");
        } else {
            info!(live = self.live.len(), "Realtime hub stopped, dropping live clients");
        }
    }

    fn handle_register(&mut self, handle: SessionHandle) {
        let id = handle.id();
        if self.live.admit(handle) {
            debug!(client_id = %id, live = self.live.len(), "Client registered");
        }
    }

    fn handle_unregister(&mut self, id: ClientId) {
        if self.live.evict(&id) {
            debug!(client_id = %id, live = self.live.len(), "Client unregistered");
        }
    }

    fn handle_broadcast(&mut self, frame: EncodedEnvelope) {
        let outcome = self.live.fan_out(&frame);
        debug!(
            event_type = %frame.event_type(),
            bytes = frame.as_str().len(),
            recipients = outcome.delivered,
            evicted = outcome.evicted.len(),
            "Broadcast event"
        );
    }
}
