//! Payload of the `post_created` notification.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// What live clients learn about a freshly committed post.
///
/// Mirrors the list item the feed renders, so a client can prepend it
/// without refetching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: String,
    pub title: String,
    pub image_url: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: Timestamp,
}
