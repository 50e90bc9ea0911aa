//! Notification channel implementations

mod email;

pub use email::SendGridChannel;

use super::types::ChannelType;
use crate::config::Config;
use crate::utils::error::{AlertError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

/// A message ready for delivery
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub subject: String,
    /// Plain text body
    pub body: Option<String>,
    pub html_body: Option<String>,
    pub recipients: Vec<String>,
    /// Provider-side tags such as rule id or digest size
    pub metadata: BTreeMap<String, String>,
}

impl Message {
    pub fn new(subject: impl Into<String>, recipients: Vec<String>) -> Self {
        Self {
            subject: subject.into(),
            recipients,
            ..Default::default()
        }
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_html_body(mut self, html_body: impl Into<String>) -> Self {
        self.html_body = Some(html_body.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// A message needs at least one recipient and one body
    pub fn validate(&self) -> Result<()> {
        if self.recipients.iter().all(|r| r.trim().is_empty()) {
            return Err(AlertError::delivery("Message has no recipients"));
        }

        let has_body = self.body.as_deref().is_some_and(|b| !b.is_empty())
            || self.html_body.as_deref().is_some_and(|b| !b.is_empty());
        if !has_body {
            return Err(AlertError::delivery("Message has neither a text nor an HTML body"));
        }

        Ok(())
    }
}

/// Notification channel trait
#[async_trait::async_trait]
pub trait Channel: Send + Sync + std::fmt::Debug {
    /// Delivery mechanism identifier
    fn channel_type(&self) -> ChannelType;

    /// Deliver one message to all of its recipients
    async fn send(&self, message: &Message) -> Result<()>;

    /// Send a canned validation message.
    ///
    /// An empty `recipient` targets the channel's own sender address.
    async fn test(&self, recipient: &str) -> Result<()>;
}

/// Send through `channel`, failing with a timeout error after `deadline`
pub async fn send_with_deadline(
    channel: &dyn Channel,
    message: &Message,
    deadline: Duration,
) -> Result<()> {
    match tokio::time::timeout(deadline, channel.send(message)).await {
        Ok(result) => result,
        Err(_) => Err(AlertError::timeout(format!(
            "{} channel did not complete within {:?}",
            channel.channel_type(),
            deadline
        ))),
    }
}

/// Build the channel of the requested type from configuration
pub fn build_channel(channel_type: ChannelType, config: &Config) -> Result<Arc<dyn Channel>> {
    match channel_type {
        ChannelType::Email => {
            let email = config.require_email()?;
            let channel = SendGridChannel::new(email.clone(), config.alerting.send_timeout())?;
            Ok(Arc::new(channel))
        }
        ChannelType::Webhook | ChannelType::Push => Err(AlertError::config(format!(
            "{} channels are not available yet",
            channel_type
        ))),
    }
}

/// Channels available to the engine, keyed by type
#[derive(Debug, Default, Clone)]
pub struct ChannelRegistry {
    channels: HashMap<ChannelType, Arc<dyn Channel>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build every channel the configuration has settings for
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut registry = Self::new();
        if config.email.is_some() {
            registry.register(build_channel(ChannelType::Email, config)?);
        }
        Ok(registry)
    }

    /// Add a channel, replacing any previous one of the same type
    pub fn register(&mut self, channel: Arc<dyn Channel>) {
        self.channels.insert(channel.channel_type(), channel);
    }

    pub fn get(&self, channel_type: ChannelType) -> Result<Arc<dyn Channel>> {
        self.channels.get(&channel_type).cloned().ok_or_else(|| {
            AlertError::config(format!("No {} channel is configured", channel_type))
        })
    }

    pub fn channel_types(&self) -> Vec<ChannelType> {
        let mut types: Vec<_> = self.channels.keys().copied().collect();
        types.sort_by_key(|t| t.as_str());
        types
    }
}
