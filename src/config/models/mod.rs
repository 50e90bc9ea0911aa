//! Configuration data models
//!
//! This module defines all configuration structures used by the alerting engine.

pub mod alerting;
pub mod email;
pub mod logging;
pub mod storage;

pub use alerting::*;
pub use email::*;
pub use logging::*;
pub use storage::*;

/// Default number of flush attempts before a batched alert is given up
pub fn default_max_flush_retries() -> u32 {
    3
}

/// Default per-send deadline in seconds
pub fn default_send_timeout_secs() -> u64 {
    10
}

/// Default time allowed for the final flush on shutdown
pub fn default_shutdown_grace_secs() -> u64 {
    15
}

pub fn default_sendgrid_base_url() -> String {
    "https://api.sendgrid.com".to_string()
}

pub fn default_database_url() -> String {
    "sqlite://botwatch-alerts.db?mode=rwc".to_string()
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_log_level() -> String {
    "info".to_string()
}
