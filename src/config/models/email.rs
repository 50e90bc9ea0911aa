use super::*;
use serde::{Deserialize, Serialize};

/// Email channel configuration (SendGrid)
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SendGrid API key
    pub api_key: String,
    /// Sender address, also the default target of channel tests
    pub from_address: String,
    /// Sender display name
    #[serde(default)]
    pub from_name: Option<String>,
    /// API base URL
    #[serde(default = "default_sendgrid_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("api_key", &"***")
            .field("from_address", &self.from_address)
            .field("from_name", &self.from_name)
            .field("base_url", &self.base_url)
            .finish()
    }
}
