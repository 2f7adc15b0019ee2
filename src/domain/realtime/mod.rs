//! Real-time notification vocabulary: envelopes and their payloads.

mod envelope;
mod post;

pub use envelope::{decode_envelope, EncodedEnvelope, EncodingError, Envelope, EventType};
pub use post::PostSummary;
