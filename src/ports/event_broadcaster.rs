//! EventBroadcaster port - fire-and-forget live notifications.
//!
//! The write path calls this after a successful commit. Implementations must
//! return promptly and never report failure: live notification is best effort
//! and must not turn a committed write into an error response.

use crate::domain::realtime::PostSummary;

/// Port for pushing domain events to connected live clients.
pub trait EventBroadcaster: Send + Sync {
    /// Announce that `post` was created.
    fn broadcast_post_created(&self, post: &PostSummary);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn EventBroadcaster) {}
}
