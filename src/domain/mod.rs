//! Domain layer - value objects and event vocabulary.

pub mod foundation;
pub mod realtime;
