//! Test fixtures and data factories

use botwatch_alerts::{
    BotStatusEvent, DeliveryMode, NewAlertRule, ResourceType, RuleBinding, Severity, TradeEvent,
    TriggerType,
};
use chrono::{DateTime, Utc};
use serde_json::json;

/// Factory for rule inputs
pub struct RuleFactory;

impl RuleFactory {
    /// Critical immediate rule firing when a bot enters the error state
    pub fn error_status(bot_id: &str, cooldown_seconds: u64) -> NewAlertRule {
        NewAlertRule {
            name: "Bot errored".to_string(),
            binding: RuleBinding::resource(bot_id),
            resource_type: ResourceType::Bot,
            trigger_type: TriggerType::StatusChange,
            conditions: json!({"trigger_on": ["error"]}),
            severity: Severity::Critical,
            delivery_mode: None,
            cooldown_seconds,
            recipients: vec!["ops@example.com".to_string()],
            enabled: true,
        }
    }

    /// Batched digest of every closed trade under an owner
    pub fn trade_digest(owner_id: &str) -> NewAlertRule {
        NewAlertRule {
            name: "Trades".to_string(),
            binding: RuleBinding::owner(owner_id),
            resource_type: ResourceType::Bot,
            trigger_type: TriggerType::TradeClosed,
            conditions: json!({}),
            severity: Severity::Info,
            delivery_mode: Some(DeliveryMode::Batched),
            cooldown_seconds: 0,
            recipients: vec!["desk@example.com".to_string()],
            enabled: true,
        }
    }
}

/// Factory for monitor events
pub struct EventFactory;

impl EventFactory {
    pub fn status(bot_id: &str, old: &str, new: &str, at: DateTime<Utc>) -> BotStatusEvent {
        BotStatusEvent {
            bot_id: bot_id.to_string(),
            bot_name: "Momentum".to_string(),
            owner_id: "org-1".to_string(),
            old_status: old.to_string(),
            new_status: new.to_string(),
            timestamp: at,
        }
    }

    pub fn trade(bot_id: &str, pair: &str, profit_percent: f64, at: DateTime<Utc>) -> TradeEvent {
        TradeEvent {
            bot_id: bot_id.to_string(),
            bot_name: "Momentum".to_string(),
            owner_id: "org-1".to_string(),
            pair: pair.to_string(),
            profit_percent,
            profit_abs: None,
            daily_profit_percent: None,
            drawdown_percent: None,
            timestamp: at,
        }
    }
}
