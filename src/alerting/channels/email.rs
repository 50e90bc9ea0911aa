//! SendGrid email channel

use super::{Channel, Message};
use crate::alerting::types::ChannelType;
use crate::config::{EmailConfig, Validate};
use crate::utils::error::{AlertError, Result};
use crate::utils::{is_valid_email, truncate_string};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

/// Email channel backed by the SendGrid v3 mail API
#[derive(Debug, Clone)]
pub struct SendGridChannel {
    client: reqwest::Client,
    config: EmailConfig,
    endpoint: String,
}

impl SendGridChannel {
    /// Create the channel; fails with a config error when credentials are missing
    pub fn new(config: EmailConfig, timeout: Duration) -> Result<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::config(format!("Failed to build HTTP client: {}", e)))?;

        let endpoint = format!("{}/v3/mail/send", config.base_url.trim_end_matches('/'));

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    pub fn from_address(&self) -> &str {
        &self.config.from_address
    }

    fn payload(&self, message: &Message) -> serde_json::Value {
        // One personalization per recipient
        let personalizations: Vec<_> = message
            .recipients
            .iter()
            .filter(|r| !r.trim().is_empty())
            .map(|r| json!({ "to": [{ "email": r.trim() }] }))
            .collect();

        let mut content = Vec::new();
        if let Some(body) = message.body.as_deref().filter(|b| !b.is_empty()) {
            content.push(json!({ "type": "text/plain", "value": body }));
        }
        if let Some(html) = message.html_body.as_deref().filter(|b| !b.is_empty()) {
            content.push(json!({ "type": "text/html", "value": html }));
        }

        let mut from = json!({ "email": self.config.from_address });
        if let Some(name) = &self.config.from_name {
            from["name"] = json!(name);
        }

        let mut payload = json!({
            "personalizations": personalizations,
            "from": from,
            "subject": message.subject,
            "content": content,
        });
        if !message.metadata.is_empty() {
            payload["custom_args"] = json!(message.metadata);
        }
        payload
    }
}

#[async_trait::async_trait]
impl Channel for SendGridChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn send(&self, message: &Message) -> Result<()> {
        message.validate()?;

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&self.payload(message))
            .send()
            .await
            .map_err(|e| AlertError::delivery(format!("Failed to reach SendGrid: {}", e)))?;

        let status = response.status();
        if status.as_u16() >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::delivery(format!(
                "SendGrid returned status {}: {}",
                status,
                truncate_string(&body, 512)
            )));
        }

        debug!(
            recipients = message.recipients.len(),
            subject = %message.subject,
            "Email accepted by SendGrid"
        );
        Ok(())
    }

    async fn test(&self, recipient: &str) -> Result<()> {
        let target = match recipient.trim() {
            "" => self.config.from_address.clone(),
            other => other.to_string(),
        };

        if !is_valid_email(&target) {
            return Err(AlertError::validation(format!(
                "Invalid test recipient: '{}'",
                target
            )));
        }

        let message = Message::new("Botwatch notification channel test", vec![target])
            .with_body(
                "This is a test message from Botwatch alerts. \
                 If you received it, your email notifications are configured correctly.",
            )
            .with_html_body(
                "<p>This is a test message from Botwatch alerts.</p>\
                 <p>If you received it, your email notifications are configured correctly.</p>",
            )
            .with_metadata("kind", "channel_test");

        self.send(&message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sendgrid_base_url;

    fn config() -> EmailConfig {
        EmailConfig {
            api_key: "SG.key".to_string(),
            from_address: "alerts@example.com".to_string(),
            from_name: Some("Botwatch".to_string()),
            base_url: default_sendgrid_base_url(),
        }
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let config = EmailConfig {
            api_key: String::new(),
            ..config()
        };
        assert!(matches!(
            SendGridChannel::new(config, Duration::from_secs(5)),
            Err(AlertError::Config(_))
        ));
    }

    #[test]
    fn test_endpoint_and_payload_shape() {
        let channel = SendGridChannel::new(
            EmailConfig {
                base_url: "https://mail.example.com/".to_string(),
                ..config()
            },
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(channel.endpoint, "https://mail.example.com/v3/mail/send");

        let message = Message::new(
            "[CRITICAL] Bot error",
            vec!["a@example.com".to_string(), "b@example.com".to_string()],
        )
        .with_body("text")
        .with_html_body("<p>html</p>")
        .with_metadata("rule_id", "r-1");

        let payload = channel.payload(&message);
        assert_eq!(payload["personalizations"].as_array().unwrap().len(), 2);
        assert_eq!(payload["personalizations"][1]["to"][0]["email"], "b@example.com");
        assert_eq!(payload["from"]["name"], "Botwatch");
        assert_eq!(payload["content"][0]["type"], "text/plain");
        assert_eq!(payload["content"][1]["type"], "text/html");
        assert_eq!(payload["custom_args"]["rule_id"], "r-1");
    }
}
