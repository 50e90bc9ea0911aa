//! Request-scoped access to the alert manager

use super::manager::AlertManager;
use crate::utils::error::{AlertError, Result};
use crate::utils::generate_id;
use std::sync::Arc;

/// Per-request context handed to resolvers and services
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    /// Authenticated caller, if any
    pub user_id: Option<String>,
    alert_manager: Option<Arc<AlertManager>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self {
            request_id: generate_id(),
            user_id: None,
            alert_manager: None,
        }
    }

    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn with_alert_manager(mut self, manager: Arc<AlertManager>) -> Self {
        self.alert_manager = Some(manager);
        self
    }

    /// The alert manager of this request; an error when none was attached
    pub fn alert_manager(&self) -> Result<&Arc<AlertManager>> {
        self.alert_manager
            .as_ref()
            .ok_or_else(|| AlertError::internal("No alert manager attached to the request context"))
    }

    /// Caller id, or a `Permission` error for anonymous requests
    pub fn require_user(&self) -> Result<&str> {
        self.user_id
            .as_deref()
            .ok_or_else(|| AlertError::permission("Request is not authenticated"))
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new()
    }
}
