//! Configuration validation
//!
//! This module provides validation logic for all configuration structures.

use super::models::*;
use crate::utils::error::{AlertError, Result};
use crate::utils::is_valid_email;

/// Trait for validating configuration sections
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

impl Validate for AlertingConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_interval_secs == 0 {
            return Err(AlertError::Config(
                "Batch interval must be greater than 0".to_string(),
            ));
        }

        if self.max_flush_retries == 0 {
            return Err(AlertError::Config(
                "Max flush retries must be greater than 0".to_string(),
            ));
        }

        if self.send_timeout_secs == 0 {
            return Err(AlertError::Config(
                "Send timeout must be greater than 0".to_string(),
            ));
        }

        if self.shutdown_grace_secs == 0 {
            return Err(AlertError::Config(
                "Shutdown grace period must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for EmailConfig {
    fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(AlertError::Config("SendGrid API key cannot be empty".to_string()));
        }

        if !is_valid_email(&self.from_address) {
            return Err(AlertError::Config(format!(
                "Email from address is not a valid address: '{}'",
                self.from_address
            )));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(AlertError::Config(format!(
                "Email base URL must use http:// or https://, got: {}",
                self.base_url
            )));
        }

        Ok(())
    }
}

impl Validate for DatabaseConfig {
    fn validate(&self) -> Result<()> {
        if self.url.is_empty() {
            return Err(AlertError::Config("Database URL cannot be empty".to_string()));
        }

        if self.max_connections == 0 {
            return Err(AlertError::Config(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<()> {
        if self.level.trim().is_empty() {
            return Err(AlertError::Config("Log level cannot be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_config() -> EmailConfig {
        EmailConfig {
            api_key: "SG.test".to_string(),
            from_address: "alerts@example.com".to_string(),
            from_name: None,
            base_url: default_sendgrid_base_url(),
        }
    }

    #[test]
    fn test_alerting_config_requires_positive_interval() {
        assert!(AlertingConfig::new(900).validate().is_ok());
        assert!(matches!(
            AlertingConfig::new(0).validate(),
            Err(AlertError::Config(_))
        ));
    }

    #[test]
    fn test_alerting_config_rejects_zero_retries() {
        let config = AlertingConfig {
            max_flush_retries: 0,
            ..AlertingConfig::new(60)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_email_config_validation() {
        assert!(email_config().validate().is_ok());

        let missing_key = EmailConfig {
            api_key: "  ".to_string(),
            ..email_config()
        };
        assert!(missing_key.validate().is_err());

        let bad_from = EmailConfig {
            from_address: "not-an-address".to_string(),
            ..email_config()
        };
        assert!(bad_from.validate().is_err());

        let bad_url = EmailConfig {
            base_url: "ftp://mail".to_string(),
            ..email_config()
        };
        assert!(bad_url.validate().is_err());
    }

    #[test]
    fn test_email_config_debug_redacts_key() {
        let rendered = format!("{:?}", email_config());
        assert!(!rendered.contains("SG.test"));
        assert!(rendered.contains("***"));
    }
}
