//! HTTP adapters - REST endpoints served next to the WebSocket route.

pub mod app;
pub mod health;

pub use app::app_router;
pub use health::health_router;
