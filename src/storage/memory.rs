//! In-memory [`AlertStore`]

use super::{AlertStore, creation_order, is_candidate};
use crate::alerting::types::{AlertEvent, AlertRule, DeliveryStatus, ResourceType, RuleBinding};
use crate::utils::error::{AlertError, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Store keeping rules and audit rows in process memory
#[derive(Debug, Default)]
pub struct InMemoryAlertStore {
    rules: RwLock<HashMap<String, AlertRule>>,
    events: RwLock<Vec<AlertEvent>>,
}

impl InMemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every audit row in insertion order
    pub fn events(&self) -> Vec<AlertEvent> {
        self.events.read().clone()
    }

    /// Audit rows with the given status
    pub fn events_with_status(&self, status: DeliveryStatus) -> Vec<AlertEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.delivery_status == status)
            .cloned()
            .collect()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.read().len()
    }
}

#[async_trait::async_trait]
impl AlertStore for InMemoryAlertStore {
    async fn insert_rule(&self, rule: &AlertRule) -> Result<()> {
        let mut rules = self.rules.write();
        if rules.contains_key(&rule.id) {
            return Err(AlertError::persistence(format!(
                "Rule {} already exists",
                rule.id
            )));
        }
        rules.insert(rule.id.clone(), rule.clone());
        Ok(())
    }

    async fn update_rule(&self, rule: &AlertRule) -> Result<()> {
        match self.rules.write().get_mut(&rule.id) {
            Some(stored) => {
                *stored = rule.clone();
                Ok(())
            }
            None => Err(AlertError::not_found(format!("Rule {} not found", rule.id))),
        }
    }

    async fn delete_rule(&self, rule_id: &str) -> Result<()> {
        self.rules
            .write()
            .remove(rule_id)
            .map(|_| ())
            .ok_or_else(|| AlertError::not_found(format!("Rule {} not found", rule_id)))
    }

    async fn get_rule(&self, rule_id: &str) -> Result<Option<AlertRule>> {
        Ok(self.rules.read().get(rule_id).cloned())
    }

    async fn list_rules(&self, binding: &RuleBinding) -> Result<Vec<AlertRule>> {
        let mut rules: Vec<_> = self
            .rules
            .read()
            .values()
            .filter(|r| &r.binding == binding)
            .cloned()
            .collect();
        rules.sort_by(creation_order);
        Ok(rules)
    }

    async fn find_candidate_rules(
        &self,
        resource_id: &str,
        owner_id: &str,
        resource_type: ResourceType,
    ) -> Result<Vec<AlertRule>> {
        let mut rules: Vec<_> = self
            .rules
            .read()
            .values()
            .filter(|r| is_candidate(r, resource_id, owner_id, resource_type))
            .cloned()
            .collect();
        rules.sort_by(creation_order);
        Ok(rules)
    }

    async fn insert_event(&self, event: &AlertEvent) -> Result<()> {
        self.events.write().push(event.clone());
        Ok(())
    }

    async fn update_event_status(
        &self,
        event_id: &str,
        status: DeliveryStatus,
        error_message: Option<&str>,
    ) -> Result<()> {
        let mut events = self.events.write();
        let event = events
            .iter_mut()
            .find(|e| e.id == event_id)
            .ok_or_else(|| AlertError::not_found(format!("Alert event {} not found", event_id)))?;
        event.delivery_status = status;
        event.error_message = error_message.map(str::to_string);
        Ok(())
    }

    async fn latest_delivered_event(
        &self,
        rule_id: &str,
        resource_id: &str,
    ) -> Result<Option<AlertEvent>> {
        Ok(self
            .events
            .read()
            .iter()
            .filter(|e| {
                e.rule_id == rule_id
                    && e.resource_id == resource_id
                    && e.delivery_status.counts_for_cooldown()
            })
            .max_by_key(|e| e.timestamp)
            .cloned())
    }

    async fn list_events(
        &self,
        rule_id: &str,
        resource_id: &str,
        limit: u64,
    ) -> Result<Vec<AlertEvent>> {
        let mut events: Vec<_> = self
            .events
            .read()
            .iter()
            .filter(|e| e.rule_id == rule_id && e.resource_id == resource_id)
            .cloned()
            .collect();
        events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        events.truncate(limit as usize);
        Ok(events)
    }
}
