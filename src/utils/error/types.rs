//! Error type definitions

use thiserror::Error;

/// Result type alias for the alerting engine
pub type Result<T> = std::result::Result<T, AlertError>;

/// Main error type for the alerting engine
#[derive(Error, Debug)]
pub enum AlertError {
    /// Malformed rule definitions or conditions
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authorization denied after the self-healing retry
    #[error("Permission denied: {0}")]
    Permission(String),

    /// Errors reported by the authorization gateway itself
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Channel send failures
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// Audit or rule persistence failures
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Timeout errors
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),

    /// Non-fatal failures collected while dispatching a batch of matches
    #[error("{} alert dispatch failure(s): {}", .0.len(), join_messages(.0))]
    Aggregate(Vec<AlertError>),
}

fn join_messages(errors: &[AlertError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
