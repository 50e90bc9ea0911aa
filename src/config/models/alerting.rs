use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Alert evaluation and delivery configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertingConfig {
    /// Digest flush interval for batched rules. Applies to every batched
    /// rule and has no default: deployments must choose it explicitly.
    pub batch_interval_secs: u64,
    /// Flush attempts per batched alert before it is marked failed
    #[serde(default = "default_max_flush_retries")]
    pub max_flush_retries: u32,
    /// Deadline for a single channel send
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
    /// Deadline for the final flush performed on shutdown
    #[serde(default = "default_shutdown_grace_secs")]
    pub shutdown_grace_secs: u64,
}

impl AlertingConfig {
    /// Create a configuration with the given batch interval and default limits
    pub fn new(batch_interval_secs: u64) -> Self {
        Self {
            batch_interval_secs,
            max_flush_retries: default_max_flush_retries(),
            send_timeout_secs: default_send_timeout_secs(),
            shutdown_grace_secs: default_shutdown_grace_secs(),
        }
    }

    pub fn batch_interval(&self) -> Duration {
        Duration::from_secs(self.batch_interval_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(self.send_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}
