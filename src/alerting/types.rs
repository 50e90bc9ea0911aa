//! Alert rule and audit record types

use super::conditions::Trigger;
use crate::utils::error::{AlertError, Result};
use crate::utils::{generate_id, is_valid_email};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Implements `as_str`, `Display` and `FromStr` for unit enums stored as strings
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $value),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AlertError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($value => Ok(Self::$variant),)+
                    other => Err(AlertError::validation(format!(
                        "Unknown {}: '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }
    };
}

/// Kind of monitored resource a rule or event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Bot,
    Strategy,
    Runner,
    Organization,
}

string_enum!(ResourceType {
    Bot => "bot",
    Strategy => "strategy",
    Runner => "runner",
    Organization => "organization",
});

/// What kind of event fires a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    StatusChange,
    LargeProfitLoss,
    DrawdownThreshold,
    DailyLossLimit,
    TradeClosed,
    BacktestCompleted,
}

string_enum!(TriggerType {
    StatusChange => "status_change",
    LargeProfitLoss => "large_profit_loss",
    DrawdownThreshold => "drawdown_threshold",
    DailyLossLimit => "daily_loss_limit",
    TradeClosed => "trade_closed",
    BacktestCompleted => "backtest_completed",
});

/// Alert severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

string_enum!(Severity {
    Info => "info",
    Warning => "warning",
    Critical => "critical",
});

impl Severity {
    /// Delivery mode used when a rule does not choose one explicitly
    pub fn default_delivery_mode(&self) -> DeliveryMode {
        match self {
            Severity::Critical | Severity::Warning => DeliveryMode::Immediate,
            Severity::Info => DeliveryMode::Batched,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Critical => "CRITICAL",
        }
    }
}

/// Whether matches are sent right away or collected into digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Immediate,
    Batched,
}

string_enum!(DeliveryMode {
    Immediate => "immediate",
    Batched => "batched",
});

/// Delivery mechanism behind a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Email,
    Webhook,
    Push,
}

string_enum!(ChannelType {
    Email => "email",
    Webhook => "webhook",
    Push => "push",
});

/// Outcome recorded on an audit row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// Persisted for a batched rule, waiting for the next digest flush
    Queued,
    Sent,
    Suppressed,
    Failed,
}

string_enum!(DeliveryStatus {
    Queued => "queued",
    Sent => "sent",
    Suppressed => "suppressed",
    Failed => "failed",
});

impl DeliveryStatus {
    /// Statuses that start a cooldown window
    pub const COOLDOWN: [DeliveryStatus; 2] = [DeliveryStatus::Sent, DeliveryStatus::Queued];

    pub fn counts_for_cooldown(&self) -> bool {
        Self::COOLDOWN.contains(self)
    }
}

/// What a rule is attached to. Exactly one binding kind exists per rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleBinding {
    /// Every resource of the rule's type under this owner
    Owner { owner_id: String },
    /// One concrete bot, strategy or runner
    Resource { resource_id: String },
}

impl RuleBinding {
    pub fn owner(owner_id: impl Into<String>) -> Self {
        Self::Owner {
            owner_id: owner_id.into(),
        }
    }

    pub fn resource(resource_id: impl Into<String>) -> Self {
        Self::Resource {
            resource_id: resource_id.into(),
        }
    }

    pub fn owner_id(&self) -> Option<&str> {
        match self {
            Self::Owner { owner_id } => Some(owner_id),
            Self::Resource { .. } => None,
        }
    }

    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::Owner { .. } => None,
            Self::Resource { resource_id } => Some(resource_id),
        }
    }

    /// Identifier permission checks are made against
    pub fn scope_id(&self) -> &str {
        match self {
            Self::Owner { owner_id } => owner_id,
            Self::Resource { resource_id } => resource_id,
        }
    }
}

/// Upper bound for `cooldown_seconds` (one year)
pub const MAX_COOLDOWN_SECONDS: u64 = 365 * 24 * 60 * 60;

/// Alert rule definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRule {
    pub id: String,
    pub name: String,
    pub binding: RuleBinding,
    pub resource_type: ResourceType,
    pub trigger_type: TriggerType,
    /// Raw conditions as stored; see [`AlertRule::trigger`]
    pub conditions: serde_json::Value,
    pub severity: Severity,
    pub delivery_mode: DeliveryMode,
    /// Minimum spacing between deliveries for one concrete resource
    pub cooldown_seconds: u64,
    /// Empty means the rule is inert until someone configures it
    pub recipients: Vec<String>,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AlertRule {
    /// Parse the stored conditions into the typed trigger for this rule
    pub fn trigger(&self) -> Result<Trigger> {
        Trigger::parse(self.trigger_type, &self.conditions)
    }

    pub fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cooldown_seconds.min(MAX_COOLDOWN_SECONDS) as i64)
    }

    pub fn is_inert(&self) -> bool {
        self.recipients.is_empty()
    }

    /// Save-time validation
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AlertError::validation("Rule name cannot be empty"));
        }

        if self.binding.scope_id().trim().is_empty() {
            return Err(AlertError::validation("Rule binding id cannot be empty"));
        }

        if let Some(invalid) = self.recipients.iter().find(|r| !is_valid_email(r)) {
            return Err(AlertError::validation(format!(
                "Invalid recipient email address: '{}'",
                invalid
            )));
        }

        if self.cooldown_seconds > MAX_COOLDOWN_SECONDS {
            return Err(AlertError::validation(format!(
                "Cooldown cannot exceed {} seconds",
                MAX_COOLDOWN_SECONDS
            )));
        }

        self.trigger()?;
        Ok(())
    }
}

/// Input for creating a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlertRule {
    pub name: String,
    pub binding: RuleBinding,
    pub resource_type: ResourceType,
    pub trigger_type: TriggerType,
    #[serde(default)]
    pub conditions: serde_json::Value,
    pub severity: Severity,
    /// Falls back to [`Severity::default_delivery_mode`]
    #[serde(default)]
    pub delivery_mode: Option<DeliveryMode>,
    #[serde(default)]
    pub cooldown_seconds: u64,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl NewAlertRule {
    pub fn into_rule(self) -> AlertRule {
        let now = Utc::now();
        AlertRule {
            id: generate_id(),
            name: self.name.trim().to_string(),
            binding: self.binding,
            resource_type: self.resource_type,
            trigger_type: self.trigger_type,
            conditions: self.conditions,
            delivery_mode: self
                .delivery_mode
                .unwrap_or_else(|| self.severity.default_delivery_mode()),
            severity: self.severity,
            cooldown_seconds: self.cooldown_seconds,
            recipients: normalize_recipients(self.recipients),
            enabled: self.enabled,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update of a rule; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertRuleUpdate {
    pub name: Option<String>,
    pub trigger_type: Option<TriggerType>,
    pub conditions: Option<serde_json::Value>,
    pub severity: Option<Severity>,
    pub delivery_mode: Option<DeliveryMode>,
    pub cooldown_seconds: Option<u64>,
    pub recipients: Option<Vec<String>>,
    pub enabled: Option<bool>,
}

impl AlertRuleUpdate {
    pub fn apply(self, rule: &mut AlertRule) {
        if let Some(name) = self.name {
            rule.name = name.trim().to_string();
        }
        if let Some(trigger_type) = self.trigger_type {
            rule.trigger_type = trigger_type;
        }
        if let Some(conditions) = self.conditions {
            rule.conditions = conditions;
        }
        if let Some(severity) = self.severity {
            rule.severity = severity;
        }
        if let Some(delivery_mode) = self.delivery_mode {
            rule.delivery_mode = delivery_mode;
        }
        if let Some(cooldown_seconds) = self.cooldown_seconds {
            rule.cooldown_seconds = cooldown_seconds;
        }
        if let Some(recipients) = self.recipients {
            rule.recipients = normalize_recipients(recipients);
        }
        if let Some(enabled) = self.enabled {
            rule.enabled = enabled;
        }
        rule.updated_at = Utc::now();
    }
}

/// Trim and drop duplicate recipients while keeping their order
fn normalize_recipients(recipients: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    recipients
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty() && seen.insert(r.to_lowercase()))
        .collect()
}

/// Audit record of one rule match attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertEvent {
    pub id: String,
    pub rule_id: String,
    /// Concrete resource that triggered the rule
    pub resource_id: String,
    pub timestamp: DateTime<Utc>,
    pub payload: serde_json::Value,
    pub delivery_status: DeliveryStatus,
    pub channel_type: ChannelType,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn new(
        rule_id: impl Into<String>,
        resource_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        payload: serde_json::Value,
        delivery_status: DeliveryStatus,
        channel_type: ChannelType,
    ) -> Self {
        Self {
            id: generate_id(),
            rule_id: rule_id.into(),
            resource_id: resource_id.into(),
            timestamp,
            payload,
            delivery_status,
            channel_type,
            error_message: None,
            created_at: Utc::now(),
        }
    }
}
