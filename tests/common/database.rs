//! Test database utilities
//!
//! Provides an in-memory SQLite alert store. Each test gets an isolated
//! database instance.

use botwatch_alerts::config::DatabaseConfig;
use botwatch_alerts::storage::SeaOrmAlertStore;
use std::sync::Arc;

/// Test database wrapper providing isolated in-memory SQLite instances
#[derive(Debug, Clone)]
pub struct TestDatabase {
    inner: Arc<SeaOrmAlertStore>,
}

impl TestDatabase {
    /// Create a migrated in-memory store
    pub async fn new() -> Self {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1, // In-memory DB only supports 1 connection
            connection_timeout: 5,
        };

        let store = SeaOrmAlertStore::connect(&config)
            .await
            .expect("Failed to create in-memory test database");

        store
            .migrate()
            .await
            .expect("Failed to run database migrations");

        Self {
            inner: Arc::new(store),
        }
    }

    pub fn store(&self) -> &SeaOrmAlertStore {
        &self.inner
    }

    pub fn store_arc(&self) -> Arc<SeaOrmAlertStore> {
        Arc::clone(&self.inner)
    }
}
