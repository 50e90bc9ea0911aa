//! Recording notification channel

use async_trait::async_trait;
use botwatch_alerts::{Channel, ChannelType, Message, Result};
use parking_lot::Mutex;
use std::sync::Arc;

/// Channel that keeps every message it is asked to send
#[derive(Debug, Default)]
pub struct RecordingChannel {
    messages: Mutex<Vec<Message>>,
}

impl RecordingChannel {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<Message> {
        self.messages.lock().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn channel_type(&self) -> ChannelType {
        ChannelType::Email
    }

    async fn send(&self, message: &Message) -> Result<()> {
        message.validate()?;
        self.messages.lock().push(message.clone());
        Ok(())
    }

    async fn test(&self, recipient: &str) -> Result<()> {
        self.send(&Message::new("test", vec![recipient.to_string()]).with_body("test"))
            .await
    }
}
