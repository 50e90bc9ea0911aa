use super::*;
use serde::{Deserialize, Serialize};

/// Rule and audit trail storage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SeaORM connection URL, `sqlite://` or `postgres://`
    #[serde(default = "default_database_url")]
    pub url: String,
    /// Pool size; in-memory SQLite needs exactly one
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Seconds allowed for opening a connection
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            connection_timeout: default_connection_timeout(),
        }
    }
}
