//! Alerting engine
//!
//! Monitors hand events to the [`AlertManager`]. The [`Evaluator`] finds the
//! rules that match and applies cooldowns, the [`Dispatcher`] records an audit
//! row for every match and either sends it right away or queues it in the
//! [`Batcher`], which sends one digest per rule and recipient set on a fixed
//! interval.

pub mod batcher;
pub mod channels;
pub mod conditions;
pub mod context;
pub mod cooldown;
pub mod dispatcher;
pub mod evaluator;
pub mod events;
pub mod manager;
pub mod rules;
pub mod seed;
pub mod templates;
pub mod types;


// Re-export public types
pub use batcher::{BatchEntry, BatchKey, Batcher, FlushReport};
pub use channels::{Channel, ChannelRegistry, Message, SendGridChannel};
pub use conditions::{Direction, Trigger};
pub use context::RequestContext;
pub use cooldown::CooldownGuard;
pub use dispatcher::{DispatchReport, Dispatcher};
pub use evaluator::{Evaluator, MatchOutcome, RuleMatch};
pub use events::{BacktestEvent, BotStatusEvent, MonitorEvent, TradeEvent};
pub use manager::AlertManager;
pub use rules::AlertRuleService;
pub use seed::{default_bot_rules, seed_default_rules};
pub use types::{
    AlertEvent, AlertRule, AlertRuleUpdate, ChannelType, DeliveryMode, DeliveryStatus,
    NewAlertRule, ResourceType, RuleBinding, Severity, TriggerType,
};
