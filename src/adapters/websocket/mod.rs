//! WebSocket adapters for live post notifications.
//!
//! Pushes every broadcast event to all connected clients. There are no rooms
//! or subscriptions: each live client receives each event.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Write path (NotifyPostCreatedHandler)                │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ broadcast (never blocks)
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              Hub loop                                │
//! │   owns LiveSet │ register / unregister / broadcast, totally ordered │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ try_send into bounded mailboxes
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        ClientSession (per peer)                      │
//! │   delivery loop: mailbox → socket, probes │ liveness loop: pongs    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`hub`] - Single owner of the live set
//! - [`live_set`] - Session handles and the fan-out policy
//! - [`session`] - Delivery and liveness loops for one connection
//! - [`limits`] - Timing and capacity limits
//! - [`handler`] - Axum WebSocket upgrade handler
//! - [`axum_connection`] - Frame sink/source over an axum socket
//! - [`in_memory_connection`] - Frame sink/source over channels, for tests

pub mod axum_connection;
pub mod handler;
pub mod hub;
pub mod in_memory_connection;
pub mod limits;
pub mod live_set;
pub mod session;

pub use axum_connection::{split_socket, WsFrameSink, WsFrameSource};
pub use handler::{websocket_router, ws_handler};
pub use hub::{Hub, HubCommand, HubLoop};
pub use in_memory_connection::{in_memory_connection, RemotePeer};
pub use limits::{HubSettings, SessionLimits};
pub use live_set::{EvictionSignal, FanOut, LiveSet, Mailbox, SessionHandle};
pub use session::{ClientSession, DeliveryOutcome, LivenessOutcome, SessionTasks};
