//! Application handlers.
//!
//! Command handlers that orchestrate domain operations through ports.

pub mod post;

pub use post::{NotifyPostCreatedCommand, NotifyPostCreatedHandler};
