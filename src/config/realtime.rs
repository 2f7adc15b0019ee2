//! Real-time delivery configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::websocket::limits::{
    BROADCAST_BUFFER, MAILBOX_CAPACITY, MAX_INBOUND_FRAME_BYTES, PONG_WAIT,
    WRITE_WAIT,
};
use crate::adapters::websocket::{HubSettings, SessionLimits};

use super::error::ValidationError;

/// Hub and session limits
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Frames buffered per client before it counts as stalled
    #[serde(default = "default_mailbox_capacity")]
    pub mailbox_capacity: usize,

    /// Broadcasts the hub intake absorbs
    #[serde(default = "default_broadcast_buffer")]
    pub broadcast_buffer: usize,

    /// Upper bound on a single write, in seconds
    #[serde(default = "default_write_wait")]
    pub write_wait_secs: u64,

    /// Liveness window, in seconds. Probes go out at 9/10 of it.
    #[serde(default = "default_pong_wait")]
    pub pong_wait_secs: u64,

    /// Largest inbound frame accepted from a client
    #[serde(default = "default_max_inbound_frame_bytes")]
    pub max_inbound_frame_bytes: usize,

    /// Route the WebSocket upgrade is served on
    #[serde(default = "default_ws_path")]
    pub ws_path: String,
}

impl RealtimeConfig {
    /// Session limits derived from this configuration
    pub fn session_limits(&self) -> SessionLimits {
        SessionLimits {
            mailbox_capacity: self.mailbox_capacity,
            write_wait: Duration::from_secs(self.write_wait_secs),
            max_inbound_frame_bytes: self.max_inbound_frame_bytes,
            ..SessionLimits::with_pong_wait(Duration::from_secs(self.pong_wait_secs))
        }
    }

    /// Hub settings derived from this configuration
    pub fn hub_settings(&self) -> HubSettings {
        HubSettings {
            broadcast_buffer: self.broadcast_buffer,
            session: self.session_limits(),
        }
    }

    /// Validate real-time configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.mailbox_capacity == 0 {
            return Err(ValidationError::ZeroCapacity("mailbox_capacity"));
        }
        if self.broadcast_buffer == 0 {
            return Err(ValidationError::ZeroCapacity("broadcast_buffer"));
        }
        if self.write_wait_secs == 0 {
            return Err(ValidationError::InvalidWriteWait);
        }
        if self.pong_wait_secs < 2 {
            return Err(ValidationError::PongWaitTooShort);
        }
        if self.max_inbound_frame_bytes == 0 {
            return Err(ValidationError::InvalidFrameLimit);
        }
        if !self.ws_path.starts_with('/') {
            return Err(ValidationError::InvalidWebSocketPath(self.ws_path.clone()));
        }
        Ok(())
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: default_mailbox_capacity(),
            broadcast_buffer: default_broadcast_buffer(),
            write_wait_secs: default_write_wait(),
            pong_wait_secs: default_pong_wait(),
            max_inbound_frame_bytes: default_max_inbound_frame_bytes(),
            ws_path: default_ws_path(),
        }
    }
}

fn default_mailbox_capacity() -> usize {
    MAILBOX_CAPACITY
}

fn default_broadcast_buffer() -> usize {
    BROADCAST_BUFFER
}

fn default_write_wait() -> u64 {
    WRITE_WAIT.as_secs()
}

fn default_pong_wait() -> u64 {
    PONG_WAIT.as_secs()
}

fn default_max_inbound_frame_bytes() -> usize {
    MAX_INBOUND_FRAME_BYTES
}

fn default_ws_path() -> String {
    "/ws".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_hub_defaults() {
        let config = RealtimeConfig::default();
        assert_eq!(config.hub_settings(), HubSettings::default());
        assert_eq!(config.ws_path, "/ws");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_probe_interval_follows_pong_wait() {
        let config = RealtimeConfig {
            pong_wait_secs: 20,
            ..Default::default()
        };
        let limits = config.session_limits();
        assert_eq!(limits.pong_wait, Duration::from_secs(20));
        assert_eq!(limits.ping_period, Duration::from_secs(18));
    }

    #[test]
    fn test_validation_zero_capacities() {
        let config = RealtimeConfig {
            mailbox_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ZeroCapacity("mailbox_capacity"))
        ));

        let config = RealtimeConfig {
            broadcast_buffer: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::ZeroCapacity("broadcast_buffer"))
        ));
    }

    #[test]
    fn test_validation_timing() {
        let config = RealtimeConfig {
            write_wait_secs: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidWriteWait)));

        let config = RealtimeConfig {
            pong_wait_secs: 1,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::PongWaitTooShort)));
    }

    #[test]
    fn test_validation_frame_limit_and_path() {
        let config = RealtimeConfig {
            max_inbound_frame_bytes: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ValidationError::InvalidFrameLimit)));

        let config = RealtimeConfig {
            ws_path: "ws".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidWebSocketPath(_))
        ));
    }
}
