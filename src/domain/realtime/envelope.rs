//! The `{type, data}` envelope broadcast to every live client.
//!
//! An envelope is encoded exactly once per broadcast. The encoded form is an
//! `Arc<str>`, so every recipient's mailbox holds a pointer to the same
//! buffer instead of a copy.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tag carried in the `type` field of an envelope.
///
/// Kept as an open string rather than a closed enum: a client that decodes an
/// unknown tag gets a value it can ignore instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventType(Cow<'static, str>);

impl EventType {
    /// A post was created and committed.
    pub const POST_CREATED: EventType = EventType(Cow::Borrowed("post_created"));

    /// Creates an event type from an arbitrary tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(Cow::Owned(tag.into()))
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Decoded form of an envelope, as a client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T = serde_json::Value> {
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub data: T,
}

/// Borrowed view used for encoding so the payload is never cloned.
#[derive(Serialize)]
struct EnvelopeRef<'a, T: ?Sized> {
    #[serde(rename = "type")]
    event_type: &'a str,
    data: &'a T,
}

/// Errors raised while turning envelopes into bytes or back.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("failed to encode '{event_type}' envelope: {source}")]
    Encode {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decode envelope: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A serialized envelope, shared read-only by every recipient.
#[derive(Debug, Clone)]
pub struct EncodedEnvelope {
    event_type: EventType,
    json: Arc<str>,
}

impl EncodedEnvelope {
    /// Serializes `data` under `event_type`.
    pub fn encode<T>(event_type: EventType, data: &T) -> Result<Self, EncodingError>
    where
        T: Serialize + ?Sized,
    {
        let view = EnvelopeRef {
            event_type: event_type.as_str(),
            data,
        };
        match serde_json::to_string(&view) {
            Ok(json) => Ok(Self {
                event_type,
                json: Arc::from(json),
            }),
            Err(source) => Err(EncodingError::Encode { event_type, source }),
        }
    }

    /// Decodes the bytes back into a structured envelope.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<Envelope<T>, EncodingError> {
        decode_envelope(&self.json)
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    /// The JSON text delivered as one message frame.
    pub fn as_str(&self) -> &str {
        &self.json
    }

    /// True when both values point at the same encoded buffer.
    #[cfg(test)]
    pub fn shares_buffer_with(&self, other: &EncodedEnvelope) -> bool {
        Arc::ptr_eq(&self.json, &other.json)
    }
}

/// Decodes envelope text received off the wire.
pub fn decode_envelope<T: DeserializeOwned>(text: &str) -> Result<Envelope<T>, EncodingError> {
    serde_json::from_str(text).map_err(EncodingError::Decode)
}
