//! Alert rule control surface
//!
//! Every operation is authorized against the rule's binding before the store
//! is touched. Owner-level rules are checked against the owner id.

use super::conditions::Trigger;
use super::context::RequestContext;
use super::types::{AlertRule, AlertRuleUpdate, NewAlertRule, RuleBinding, TriggerType};
use crate::auth::{
    SCOPE_ALERT_RULES_DELETE, SCOPE_ALERT_RULES_READ, SCOPE_ALERT_RULES_WRITE,
    SelfHealingAuthorizer,
};
use crate::storage::AlertStore;
use crate::utils::error::{AlertError, Result};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone)]
pub struct AlertRuleService {
    store: Arc<dyn AlertStore>,
    authorizer: SelfHealingAuthorizer,
}

impl AlertRuleService {
    pub fn new(store: Arc<dyn AlertStore>, authorizer: SelfHealingAuthorizer) -> Self {
        Self { store, authorizer }
    }

    pub async fn create_rule(&self, ctx: &RequestContext, input: NewAlertRule) -> Result<AlertRule> {
        self.authorizer
            .authorize(ctx, SCOPE_ALERT_RULES_WRITE, input.binding.scope_id())
            .await?;

        let rule = input.into_rule();
        rule.validate()?;
        self.store.insert_rule(&rule).await?;

        info!(
            request_id = %ctx.request_id,
            rule_id = %rule.id,
            trigger = %rule.trigger_type,
            "Alert rule created"
        );
        Ok(rule)
    }

    pub async fn update_rule(
        &self,
        ctx: &RequestContext,
        rule_id: &str,
        update: AlertRuleUpdate,
    ) -> Result<AlertRule> {
        let mut rule = self.load(rule_id).await?;
        self.authorizer
            .authorize(ctx, SCOPE_ALERT_RULES_WRITE, rule.binding.scope_id())
            .await?;

        update.apply(&mut rule);
        rule.validate()?;
        self.store.update_rule(&rule).await?;

        info!(request_id = %ctx.request_id, rule_id, "Alert rule updated");
        Ok(rule)
    }

    pub async fn delete_rule(&self, ctx: &RequestContext, rule_id: &str) -> Result<()> {
        let rule = self.load(rule_id).await?;
        self.authorizer
            .authorize(ctx, SCOPE_ALERT_RULES_DELETE, rule.binding.scope_id())
            .await?;

        self.store.delete_rule(rule_id).await?;
        info!(request_id = %ctx.request_id, rule_id, "Alert rule deleted");
        Ok(())
    }

    /// Enable or disable a rule
    pub async fn toggle_rule(
        &self,
        ctx: &RequestContext,
        rule_id: &str,
        enabled: bool,
    ) -> Result<AlertRule> {
        self.update_rule(
            ctx,
            rule_id,
            AlertRuleUpdate {
                enabled: Some(enabled),
                ..Default::default()
            },
        )
        .await
    }

    pub async fn get_rule(&self, ctx: &RequestContext, rule_id: &str) -> Result<AlertRule> {
        let rule = self.load(rule_id).await?;
        self.authorizer
            .authorize(ctx, SCOPE_ALERT_RULES_READ, rule.binding.scope_id())
            .await?;
        Ok(rule)
    }

    pub async fn list_rules(&self, ctx: &RequestContext, binding: &RuleBinding) -> Result<Vec<AlertRule>> {
        self.authorizer
            .authorize(ctx, SCOPE_ALERT_RULES_READ, binding.scope_id())
            .await?;
        self.store.list_rules(binding).await
    }

    /// Check conditions for a trigger type without saving anything
    pub fn validate_conditions(
        &self,
        trigger_type: TriggerType,
        conditions: &serde_json::Value,
    ) -> Result<Trigger> {
        Trigger::parse(trigger_type, conditions)
    }

    async fn load(&self, rule_id: &str) -> Result<AlertRule> {
        self.store
            .get_rule(rule_id)
            .await?
            .ok_or_else(|| AlertError::not_found(format!("Rule {} not found", rule_id)))
    }
}
