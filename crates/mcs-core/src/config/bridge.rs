//! Stream bridge configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::serde_utils::duration_secs;
use crate::error::ConfigError;

/// Largest accepted `chunk_size` (1 MiB)
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Configuration for the bidirectional stream bridge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Maximum number of bytes taken from a source per read
    pub chunk_size: usize,

    /// How long an interrupted bridge waits for its relay tasks to notice
    /// cancellation before returning
    #[serde(with = "duration_secs")]
    pub teardown_grace: Duration,
}

impl BridgeConfig {
    /// Reject settings the relay cannot honour
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "bridge.chunk_size must be between 1 and {}, got {}",
                MAX_CHUNK_SIZE, self.chunk_size
            )));
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4096,
            teardown_grace: Duration::from_secs(1),
        }
    }
}
