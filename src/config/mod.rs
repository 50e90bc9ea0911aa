//! Configuration management for the alerting engine
//!
//! This module handles loading, validation, and environment overrides of all
//! configuration sections.

pub mod models;
pub mod validation;

pub use models::*;
pub use validation::Validate;

use crate::utils::error::{AlertError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Evaluation, batching and delivery limits
    pub alerting: AlertingConfig,
    /// Email channel; absent means no channel can be built
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Rule and audit storage
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AlertError::Config(format!("Failed to read config file: {}", e)))?;

        let config = Self::from_yaml(&content)?;

        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration from a YAML document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)
            .map_err(|e| AlertError::Config(format!("Failed to parse config: {}", e)))?;

        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Override configuration values from environment variables
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(url) = std::env::var("BOTWATCH_DATABASE_URL") {
            self.database.url = url;
        }

        if let Ok(interval) = std::env::var("BOTWATCH_BATCH_INTERVAL_SECS") {
            self.alerting.batch_interval_secs = interval
                .parse()
                .map_err(|e| AlertError::Config(format!("Invalid batch interval: {}", e)))?;
        }

        if let Ok(api_key) = std::env::var("SENDGRID_API_KEY") {
            match self.email.as_mut() {
                Some(email) => email.api_key = api_key,
                None => {
                    debug!("SENDGRID_API_KEY set but no email section configured, ignoring");
                }
            }
        }

        Ok(())
    }

    /// Get the email configuration or fail with a configuration error
    pub fn require_email(&self) -> Result<&EmailConfig> {
        self.email
            .as_ref()
            .ok_or_else(|| AlertError::config("Email channel is not configured"))
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        debug!("Validating configuration");

        self.alerting
            .validate()
            .map_err(|e| AlertError::Config(format!("Alerting config error: {}", e)))?;

        if let Some(email) = &self.email {
            email
                .validate()
                .map_err(|e| AlertError::Config(format!("Email config error: {}", e)))?;
        }

        self.database
            .validate()
            .map_err(|e| AlertError::Config(format!("Database config error: {}", e)))?;

        self.logging
            .validate()
            .map_err(|e| AlertError::Config(format!("Logging config error: {}", e)))?;

        debug!("Configuration validation completed");
        Ok(())
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| AlertError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
