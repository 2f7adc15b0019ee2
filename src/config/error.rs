//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid bind address: {0}")]
    InvalidBindAddress(String),

    #[error("Capacity must be greater than zero: {0}")]
    ZeroCapacity(&'static str),

    #[error("Write wait must be greater than zero")]
    InvalidWriteWait,

    #[error("Pong wait must be at least 2 seconds")]
    PongWaitTooShort,

    #[error("Max inbound frame size must be greater than zero")]
    InvalidFrameLimit,

    #[error("WebSocket path must start with '/': {0}")]
    InvalidWebSocketPath(String),
}
