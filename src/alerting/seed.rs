//! Default rules for newly created bots

use super::types::{
    AlertRule, DeliveryMode, NewAlertRule, ResourceType, RuleBinding, Severity, TriggerType,
};
use crate::storage::AlertStore;
use crate::utils::error::Result;
use tracing::info;

struct RuleDef {
    name: &'static str,
    trigger_type: TriggerType,
    conditions_json: &'static str,
    severity: Severity,
    delivery_mode: DeliveryMode,
    cooldown_seconds: u64,
    enabled: bool,
}

const DEFAULT_BOT_RULES: &[RuleDef] = &[
    RuleDef {
        name: "Bot entered error state",
        trigger_type: TriggerType::StatusChange,
        conditions_json: r#"{"trigger_on":["error"]}"#,
        severity: Severity::Critical,
        delivery_mode: DeliveryMode::Immediate,
        cooldown_seconds: 300,
        enabled: true,
    },
    RuleDef {
        name: "Large trade loss",
        trigger_type: TriggerType::LargeProfitLoss,
        conditions_json: r#"{"threshold_percent":10.0,"direction":"loss"}"#,
        severity: Severity::Warning,
        delivery_mode: DeliveryMode::Immediate,
        cooldown_seconds: 900,
        enabled: false,
    },
    RuleDef {
        name: "Trade closed digest",
        trigger_type: TriggerType::TradeClosed,
        conditions_json: r#"{}"#,
        severity: Severity::Info,
        delivery_mode: DeliveryMode::Batched,
        cooldown_seconds: 0,
        enabled: false,
    },
];

/// Build the default rules for a bot without storing them.
///
/// They carry no recipients, so even the enabled one stays inert until the
/// owner adds an address.
pub fn default_bot_rules(bot_id: &str) -> Result<Vec<AlertRule>> {
    DEFAULT_BOT_RULES
        .iter()
        .map(|def| {
            Ok(NewAlertRule {
                name: def.name.to_string(),
                binding: RuleBinding::resource(bot_id),
                resource_type: ResourceType::Bot,
                trigger_type: def.trigger_type,
                conditions: serde_json::from_str(def.conditions_json)?,
                severity: def.severity,
                delivery_mode: Some(def.delivery_mode),
                cooldown_seconds: def.cooldown_seconds,
                recipients: Vec::new(),
                enabled: def.enabled,
            }
            .into_rule())
        })
        .collect()
}

/// Insert the default rules for a newly created bot
pub async fn seed_default_rules(store: &dyn AlertStore, bot_id: &str) -> Result<Vec<AlertRule>> {
    let rules = default_bot_rules(bot_id)?;
    for rule in &rules {
        rule.validate()?;
        store.insert_rule(rule).await?;
    }

    info!(bot_id, rules = rules.len(), "Seeded default alert rules");
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryAlertStore;

    #[test]
    fn test_default_rule_conditions_parse() {
        for rule in default_bot_rules("bot-1").unwrap() {
            assert!(rule.validate().is_ok(), "{} should validate", rule.name);
        }
    }

    #[tokio::test]
    async fn test_seed_default_rules() {
        let store = InMemoryAlertStore::new();
        let rules = seed_default_rules(&store, "bot-1").await.unwrap();

        assert_eq!(rules.len(), 3);
        assert_eq!(store.rule_count(), 3);

        let enabled: Vec<_> = rules.iter().filter(|r| r.enabled).collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].trigger_type, TriggerType::StatusChange);
        assert_eq!(enabled[0].severity, Severity::Critical);
        assert_eq!(enabled[0].cooldown_seconds, 300);

        assert!(rules.iter().all(|r| r.recipients.is_empty()));
        assert!(rules.iter().all(|r| r.binding == RuleBinding::resource("bot-1")));

        let digest = rules.iter().find(|r| r.name == "Trade closed digest").unwrap();
        assert_eq!(digest.delivery_mode, DeliveryMode::Batched);
        assert_eq!(digest.cooldown_seconds, 0);
    }
}
