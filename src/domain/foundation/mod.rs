//! Foundation module - Shared domain primitives.
//!
//! Value objects and identifiers that form the vocabulary of the
//! snapshare domain.

mod ids;
mod timestamp;

pub use ids::ClientId;
pub use timestamp::Timestamp;
