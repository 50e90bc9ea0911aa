//! External authorization collaborator

use crate::alerting::context::RequestContext;
use crate::utils::error::{AlertError, Result};

/// Permission checks against the platform's policy engine
#[async_trait::async_trait]
pub trait AuthorizationGateway: Send + Sync + std::fmt::Debug {
    /// Whether the caller holds `scope` on `resource_id`.
    ///
    /// `Ok(false)` is a plain denial. An error means the check itself could
    /// not be answered.
    async fn check_permission(
        &self,
        ctx: &RequestContext,
        scope: &str,
        resource_id: &str,
    ) -> Result<bool>;

    /// Push the resource's grants to the policy engine
    async fn sync_resource_permissions(&self, ctx: &RequestContext, resource_id: &str)
    -> Result<()>;

    /// Whether a failed check is worth one sync and retry
    fn should_trigger_self_healing(&self, error: &AlertError) -> bool {
        is_stale_scope_error(error)
    }
}

/// Authorization errors caused by scopes that were never registered
pub fn is_stale_scope_error(error: &AlertError) -> bool {
    match error {
        AlertError::Authorization(message) => {
            let message = message.to_ascii_lowercase();
            message.contains("invalid_scope") || message.contains("resource does not exist")
        }
        _ => false,
    }
}
