use crate::config::DatabaseConfig;
use crate::utils::error::{AlertError, Result};
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{error, info};

use super::super::migration::Migrator;
use super::types::{DatabaseBackendType, SeaOrmAlertStore};

/// Pool checkout deadline; audit writes sit on the dispatch path
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(10);

impl SeaOrmAlertStore {
    /// Open the rule and audit database
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let backend_type = DatabaseBackendType::from_url(&config.url);

        let mut options = ConnectOptions::new(config.url.clone());
        options
            .max_connections(config.max_connections)
            .min_connections(1)
            .connect_timeout(Duration::from_secs(config.connection_timeout))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .sqlx_logging(true)
            .sqlx_logging_level(log::LevelFilter::Debug);

        let db = Database::connect(options).await.map_err(|e| {
            error!(backend = ?backend_type, error = %e, "Could not open alert store");
            AlertError::Database(e)
        })?;

        info!(backend = ?backend_type, pool = config.max_connections, "Alert store connected");
        Ok(Self { db, backend_type })
    }

    /// Use a connection opened elsewhere
    pub fn from_connection(db: DatabaseConnection) -> Self {
        let backend_type = match db.get_database_backend() {
            DbBackend::Postgres => DatabaseBackendType::PostgreSQL,
            _ => DatabaseBackendType::SQLite,
        };
        Self { db, backend_type }
    }

    /// Create or upgrade the `alert_rules` and `alert_events` tables
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&self.db, None).await.map_err(|e| {
            error!(error = %e, "Alert store migration failed");
            AlertError::Database(e)
        })?;
        info!("Alert store schema is up to date");
        Ok(())
    }

    pub fn backend_type(&self) -> DatabaseBackendType {
        self.backend_type
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    pub async fn health_check(&self) -> Result<()> {
        self.db.ping().await.map_err(AlertError::Database)
    }
}
