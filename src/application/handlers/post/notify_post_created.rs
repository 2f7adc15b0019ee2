//! NotifyPostCreatedHandler - announces a committed post to live clients.

use std::sync::Arc;

use tracing::debug;

use crate::domain::realtime::PostSummary;
use crate::ports::EventBroadcaster;

/// Command issued by the write path once a post has been committed.
#[derive(Debug, Clone)]
pub struct NotifyPostCreatedCommand {
    pub post: PostSummary,
}

/// Handler for post-created notifications.
///
/// Infallible from the caller's side: delivery problems are absorbed by the
/// broadcaster and never reach the write path.
pub struct NotifyPostCreatedHandler {
    broadcaster: Arc<dyn EventBroadcaster>,
}

impl NotifyPostCreatedHandler {
    pub fn new(broadcaster: Arc<dyn EventBroadcaster>) -> Self {
        Self { broadcaster }
    }

    pub fn handle(&self, cmd: NotifyPostCreatedCommand) {
        debug!(post_id = %cmd.post.id, "Announcing new post");
        self.broadcaster.broadcast_post_created(&cmd.post);
    }
}
