//! Authorization for the alert rule control surface
//!
//! Permission checks go through an [`AuthorizationGateway`]. Scopes for a
//! freshly created resource can lag behind the resource itself, so checks are
//! wrapped by the [`SelfHealingAuthorizer`], which syncs the resource's scopes
//! once and re-checks when the gateway reports a stale scope.

pub mod gateway;
pub mod registry;
pub mod self_healing;


pub use gateway::{AuthorizationGateway, is_stale_scope_error};
pub use registry::{ResourceRole, ScopeRegistry};
pub use self_healing::{AuthorizationOutcome, SelfHealingAuthorizer};

/// Scope required to list and read alert rules
pub const SCOPE_ALERT_RULES_READ: &str = "alert_rules:read";
/// Scope required to create, update and toggle alert rules
pub const SCOPE_ALERT_RULES_WRITE: &str = "alert_rules:write";
/// Scope required to delete alert rules
pub const SCOPE_ALERT_RULES_DELETE: &str = "alert_rules:delete";
