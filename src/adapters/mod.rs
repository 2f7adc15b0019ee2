//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `websocket` - Hub, client sessions and the WebSocket transport
//! - `http` - Router assembly and the health endpoint

pub mod http;
pub mod websocket;

pub use http::app_router;
pub use websocket::{Hub, HubSettings};
