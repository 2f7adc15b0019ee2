//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `FrameSink` / `FrameSource` - the two halves of an adopted live connection
//! - `EventBroadcaster` - fire-and-forget notification of connected clients

mod event_broadcaster;
mod live_connection;

pub use event_broadcaster::EventBroadcaster;
pub use live_connection::{FrameSink, FrameSource, InboundFrame, OutboundFrame, TransportError};
