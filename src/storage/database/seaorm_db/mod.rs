// Module declarations
mod connection;
mod event_ops;
mod rule_ops;
mod store;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmAlertStore};
