//! Storage layer for alert rules and the alert audit trail
//!
//! [`AlertStore`] is the persistence seam used by the evaluator, dispatcher,
//! batcher and rule service. Two implementations ship with the crate: an
//! in-memory store for tests and embedding, and a SeaORM store backed by
//! SQLite or Postgres.

/// SeaORM database backend
pub mod database;
/// In-memory backend
pub mod memory;

pub use database::SeaOrmAlertStore;
pub use memory::InMemoryAlertStore;

use crate::alerting::types::{AlertEvent, AlertRule, DeliveryStatus, ResourceType, RuleBinding};
use crate::utils::error::Result;

/// Persistence operations of the alerting engine
#[async_trait::async_trait]
pub trait AlertStore: Send + Sync + std::fmt::Debug {
    async fn insert_rule(&self, rule: &AlertRule) -> Result<()>;

    /// Replace a stored rule; `NotFound` when it does not exist
    async fn update_rule(&self, rule: &AlertRule) -> Result<()>;

    /// Delete a rule; `NotFound` when it does not exist
    async fn delete_rule(&self, rule_id: &str) -> Result<()>;

    async fn get_rule(&self, rule_id: &str) -> Result<Option<AlertRule>>;

    /// Rules attached to exactly this binding, oldest first
    async fn list_rules(&self, binding: &RuleBinding) -> Result<Vec<AlertRule>>;

    /// Enabled rules bound to `resource_id`, or to `owner_id` for
    /// `resource_type`, ordered by creation time then id
    async fn find_candidate_rules(
        &self,
        resource_id: &str,
        owner_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<AlertRule>>;

    /// Append an audit row
    async fn insert_event(&self, event: &AlertEvent) -> Result<()>;

    /// Change the delivery outcome of an audit row
    async fn update_event_status(
        &self,
        event_id: &str,
        status: DeliveryStatus,
        error_message: Option<&str>,
    ) -> Result<()>;

    /// Most recent `sent` or `queued` row for the pair, by event timestamp
    async fn latest_delivered_event(
        &self,
        rule_id: &str,
        resource_id: &str,
    ) -> Result<Option<AlertEvent>>;

    /// Audit rows for the pair, newest first
    async fn list_events(
        &self,
        rule_id: &str,
        resource_id: &str,
        limit: u64,
    ) -> Result<Vec<AlertEvent>>;
}

/// Shared ordering for candidate rules
pub(crate) fn creation_order(a: &AlertRule, b: &AlertRule) -> std::cmp::Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}

/// Whether a rule is a candidate for an event on `resource_id`
pub(crate) fn is_candidate(
    rule: &AlertRule,
    resource_id: &str,
    owner_id: &str,
    resource_type: ResourceType,
) -> bool {
    if !rule.enabled {
        return false;
    }
    match &rule.binding {
        RuleBinding::Resource { resource_id: bound } => bound == resource_id,
        RuleBinding::Owner { owner_id: bound } => {
            bound == owner_id && rule.resource_type == resource_type
        }
    }
}
