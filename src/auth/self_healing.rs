//! Permission checks with a single scope-sync retry

use super::gateway::AuthorizationGateway;
use crate::alerting::context::RequestContext;
use crate::utils::error::{AlertError, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// How a granted check was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Granted,
    /// Granted by the re-check after a scope sync
    GrantedAfterSync,
}

#[derive(Debug, Clone)]
pub struct SelfHealingAuthorizer {
    gateway: Arc<dyn AuthorizationGateway>,
}

impl SelfHealingAuthorizer {
    pub fn new(gateway: Arc<dyn AuthorizationGateway>) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Arc<dyn AuthorizationGateway> {
        &self.gateway
    }

    /// Check `scope` on `resource_id`.
    ///
    /// A stale-scope error triggers exactly one sync and one re-check. When
    /// the sync fails or the re-check is still stale, the caller gets a
    /// `Permission` error carrying the gateway's message.
    pub async fn authorize(
        &self,
        ctx: &RequestContext,
        scope: &str,
        resource_id: &str,
    ) -> Result<AuthorizationOutcome> {
        let error = match self.gateway.check_permission(ctx, scope, resource_id).await {
            Ok(true) => return Ok(AuthorizationOutcome::Granted),
            Ok(false) => return Err(denied(scope, resource_id)),
            Err(e) => e,
        };

        if !self.gateway.should_trigger_self_healing(&error) {
            return Err(error);
        }

        info!(
            request_id = %ctx.request_id,
            scope,
            resource_id,
            error = %error,
            "Stale authorization scope, syncing resource permissions"
        );

        if let Err(sync_error) = self
            .gateway
            .sync_resource_permissions(ctx, resource_id)
            .await
        {
            warn!(
                request_id = %ctx.request_id,
                resource_id,
                error = %sync_error,
                "Permission sync failed"
            );
            return Err(exhausted(scope, resource_id, &error));
        }

        match self.gateway.check_permission(ctx, scope, resource_id).await {
            Ok(true) => Ok(AuthorizationOutcome::GrantedAfterSync),
            Ok(false) => Err(denied(scope, resource_id)),
            Err(e) if self.gateway.should_trigger_self_healing(&e) => {
                Err(exhausted(scope, resource_id, &e))
            }
            Err(e) => Err(e),
        }
    }
}

fn exhausted(scope: &str, resource_id: &str, cause: &AlertError) -> AlertError {
    AlertError::permission(format!(
        "Scope '{}' on resource {} still unavailable after sync: {}",
        scope, resource_id, cause
    ))
}

fn denied(scope: &str, resource_id: &str) -> AlertError {
    AlertError::permission(format!(
        "Missing scope '{}' on resource {}",
        scope, resource_id
    ))
}
