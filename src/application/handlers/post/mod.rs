//! Post-related command handlers.

mod notify_post_created;

pub use notify_post_created::{NotifyPostCreatedCommand, NotifyPostCreatedHandler};
