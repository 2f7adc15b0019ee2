//! Snapshare - content-sharing backend with live post notifications
//!
//! This crate pushes newly created posts to every connected WebSocket client
//! through a single hub that owns the set of live clients.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
