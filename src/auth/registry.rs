//! In-process authorization gateway
//!
//! Keeps two views of resource grants: the directory, updated as soon as a
//! resource is created or shared, and the synced view the checks read from.
//! A resource present in the directory but not yet synced reports
//! `invalid_scope`, which is what the self-healing authorizer recovers from.

use super::gateway::AuthorizationGateway;
use super::{SCOPE_ALERT_RULES_DELETE, SCOPE_ALERT_RULES_READ, SCOPE_ALERT_RULES_WRITE};
use crate::alerting::context::RequestContext;
use crate::utils::error::{AlertError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Role a user holds on one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceRole {
    Owner,
    Editor,
    Viewer,
}

impl ResourceRole {
    /// Scopes granted by the role
    pub fn scopes(&self) -> &'static [&'static str] {
        match self {
            ResourceRole::Owner => &[
                SCOPE_ALERT_RULES_READ,
                SCOPE_ALERT_RULES_WRITE,
                SCOPE_ALERT_RULES_DELETE,
            ],
            ResourceRole::Editor => &[SCOPE_ALERT_RULES_READ, SCOPE_ALERT_RULES_WRITE],
            ResourceRole::Viewer => &[SCOPE_ALERT_RULES_READ],
        }
    }

    pub fn allows(&self, scope: &str) -> bool {
        self.scopes().contains(&scope)
    }
}

type Grants = HashMap<String, HashMap<String, ResourceRole>>;

#[derive(Debug, Default)]
pub struct ScopeRegistry {
    directory: RwLock<Grants>,
    synced: RwLock<Grants>,
    syncs: AtomicUsize,
}

impl ScopeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new resource and its owner; scopes are not synced yet
    pub fn register_resource(&self, resource_id: impl Into<String>, owner_id: impl Into<String>) {
        self.grant(resource_id, owner_id, ResourceRole::Owner);
    }

    /// Give `user_id` a role on a resource; takes effect after the next sync
    pub fn grant(
        &self,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        role: ResourceRole,
    ) {
        self.directory
            .write()
            .entry(resource_id.into())
            .or_default()
            .insert(user_id.into(), role);
    }

    /// Whether the resource's grants have reached the synced view
    pub fn is_synced(&self, resource_id: &str) -> bool {
        self.synced.read().contains_key(resource_id)
    }

    /// Number of syncs performed
    pub fn sync_count(&self) -> usize {
        self.syncs.load(Ordering::Relaxed)
    }
}

#[async_trait::async_trait]
impl AuthorizationGateway for ScopeRegistry {
    async fn check_permission(
        &self,
        ctx: &RequestContext,
        scope: &str,
        resource_id: &str,
    ) -> Result<bool> {
        let user_id = ctx.require_user()?;
        let synced = self.synced.read();
        let grants = synced.get(resource_id).ok_or_else(|| {
            AlertError::authorization(format!(
                "invalid_scope: no scopes registered for resource {}",
                resource_id
            ))
        })?;

        Ok(grants.get(user_id).is_some_and(|role| role.allows(scope)))
    }

    async fn sync_resource_permissions(
        &self,
        _ctx: &RequestContext,
        resource_id: &str,
    ) -> Result<()> {
        let grants = self
            .directory
            .read()
            .get(resource_id)
            .cloned()
            .ok_or_else(|| AlertError::not_found(format!("Unknown resource {}", resource_id)))?;

        debug!(resource_id, users = grants.len(), "Syncing resource scopes");
        self.synced.write().insert(resource_id.to_string(), grants);
        self.syncs.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
