//! Relay configuration with validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default replay window: five minutes.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Configuration for the ingest pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Replay window in seconds. A webhook whose timestamp differs from the
    /// receiver clock by more than this is rejected even when validly signed.
    pub tolerance_secs: u64,
    /// Identifier of the signing secret to fetch from the secret store.
    pub secret_id: String,
    /// Address or identifier of the delivery sink.
    pub sink_destination: String,
    /// Origin label attached to every forwarded event.
    pub origin: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            tolerance_secs: DEFAULT_TOLERANCE_SECS,
            secret_id: "webhook-signing-secret".to_string(),
            sink_destination: "default".to_string(),
            origin: "stripe".to_string(),
        }
    }
}

impl RelayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tolerance_secs == 0 {
            return Err(ConfigError::InvalidTolerance(
                "tolerance_secs cannot be 0".into(),
            ));
        }

        if self.secret_id.is_empty() {
            return Err(ConfigError::MissingField("secret_id"));
        }

        if self.sink_destination.is_empty() {
            return Err(ConfigError::MissingField("sink_destination"));
        }

        if self.origin.is_empty() {
            return Err(ConfigError::MissingField("origin"));
        }

        Ok(())
    }

    /// The replay window as a `Duration`.
    #[must_use]
    pub const fn tolerance(&self) -> Duration {
        Duration::from_secs(self.tolerance_secs)
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Replay window is not a usable duration
    #[error("invalid tolerance: {0}")]
    InvalidTolerance(String),

    /// A required field is empty
    #[error("missing required field: {0}")]
    MissingField(&'static str),
}
