use crate::alerting::types::{AlertEvent, AlertRule, DeliveryStatus, ResourceType, RuleBinding};
use crate::storage::AlertStore;
use crate::utils::error::Result;

use super::types::SeaOrmAlertStore;

#[async_trait::async_trait]
impl AlertStore for SeaOrmAlertStore {
    async fn insert_rule(&self, rule: &AlertRule) -> Result<()> {
        self.insert_rule_row(rule).await
    }

    async fn update_rule(&self, rule: &AlertRule) -> Result<()> {
        self.update_rule_row(rule).await
    }

    async fn delete_rule(&self, rule_id: &str) -> Result<()> {
        self.delete_rule_row(rule_id).await
    }

    async fn get_rule(&self, rule_id: &str) -> Result<Option<AlertRule>> {
        self.find_rule_by_id(rule_id).await
    }

    async fn list_rules(&self, binding: &RuleBinding) -> Result<Vec<AlertRule>> {
        self.find_rules_by_binding(binding).await
    }

    async fn find_candidate_rules(
        &self,
        resource_id: &str,
        owner_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<AlertRule>> {
        self.find_candidates(resource_id, owner_id, resource_type).await
    }

    async fn insert_event(&self, event: &AlertEvent) -> Result<()> {
        self.insert_event_row(event).await
    }

    async fn update_event_status(
        &self,
        event_id: &str,
        status: DeliveryStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        self.update_event_row_status(event_id, status, error_message)
            .await
    }

    async fn latest_delivered_event(
        &self,
        rule_id: &str,
        resource_id: &str,
    ) -> Result<Option<AlertEvent>> {
        self.find_latest_delivered(rule_id, resource_id).await
    }

    async fn list_events(
        &self,
        rule_id: &str,
        resource_id: &str,
        limit: u64,
    ) -> Result<Vec<AlertEvent>> {
        self.find_events(rule_id, resource_id, limit).await
    }
}
