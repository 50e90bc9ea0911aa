//! Domain events consumed from monitors

use super::types::ResourceType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A bot moved from one lifecycle status to another
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotStatusEvent {
    pub bot_id: String,
    pub bot_name: String,
    pub owner_id: String,
    pub old_status: String,
    pub new_status: String,
    pub timestamp: DateTime<Utc>,
}

/// A bot closed a trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub bot_id: String,
    #[serde(default)]
    pub bot_name: String,
    pub owner_id: String,
    pub pair: String,
    /// Profit of the closed trade relative to its stake
    pub profit_percent: f64,
    #[serde(default)]
    pub profit_abs: Option<f64>,
    /// Profit of the bot since the start of the trading day
    #[serde(default)]
    pub daily_profit_percent: Option<f64>,
    /// Current drawdown from the equity peak, as a positive percentage
    #[serde(default)]
    pub drawdown_percent: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// A backtest reached a terminal state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestEvent {
    pub backtest_id: String,
    /// Strategy under test; rules bind to it when present
    #[serde(default)]
    pub strategy_id: Option<String>,
    #[serde(default)]
    pub strategy_name: Option<String>,
    pub owner_id: String,
    pub status: String,
    #[serde(default)]
    pub profit_percent: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Any event the alerting engine can evaluate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum MonitorEvent {
    BotStatus(BotStatusEvent),
    Trade(TradeEvent),
    Backtest(BacktestEvent),
}

impl MonitorEvent {
    /// Concrete resource the event is about
    pub fn resource_id(&self) -> &str {
        match self {
            MonitorEvent::BotStatus(e) => &e.bot_id,
            MonitorEvent::Trade(e) => &e.bot_id,
            MonitorEvent::Backtest(e) => e.strategy_id.as_deref().unwrap_or(&e.backtest_id),
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            MonitorEvent::BotStatus(e) => &e.owner_id,
            MonitorEvent::Trade(e) => &e.owner_id,
            MonitorEvent::Backtest(e) => &e.owner_id,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            MonitorEvent::BotStatus(_) | MonitorEvent::Trade(_) => ResourceType::Bot,
            MonitorEvent::Backtest(_) => ResourceType::Strategy,
        }
    }

    /// Human readable name for templates
    pub fn resource_name(&self) -> &str {
        match self {
            MonitorEvent::BotStatus(e) => non_empty_or(&e.bot_name, &e.bot_id),
            MonitorEvent::Trade(e) => non_empty_or(&e.bot_name, &e.bot_id),
            MonitorEvent::Backtest(e) => e
                .strategy_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| self.resource_id()),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            MonitorEvent::BotStatus(e) => e.timestamp,
            MonitorEvent::Trade(e) => e.timestamp,
            MonitorEvent::Backtest(e) => e.timestamp,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MonitorEvent::BotStatus(_) => "bot_status",
            MonitorEvent::Trade(_) => "trade",
            MonitorEvent::Backtest(_) => "backtest",
        }
    }

    /// Serialized form stored on audit rows
    pub fn payload(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}

impl From<BotStatusEvent> for MonitorEvent {
    fn from(event: BotStatusEvent) -> Self {
        MonitorEvent::BotStatus(event)
    }
}

impl From<TradeEvent> for MonitorEvent {
    fn from(event: TradeEvent) -> Self {
        MonitorEvent::Trade(event)
    }
}

impl From<BacktestEvent> for MonitorEvent {
    fn from(event: BacktestEvent) -> Self {
        MonitorEvent::Backtest(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backtest(strategy_id: Option<&str>) -> BacktestEvent {
        BacktestEvent {
            backtest_id: "bt-1".to_string(),
            strategy_id: strategy_id.map(str::to_string),
            strategy_name: None,
            owner_id: "org-1".to_string(),
            status: "completed".to_string(),
            profit_percent: Some(4.2),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_backtest_binds_to_strategy_when_known() {
        let event = MonitorEvent::from(backtest(Some("strat-7")));
        assert_eq!(event.resource_id(), "strat-7");
        assert_eq!(event.resource_type(), ResourceType::Strategy);
        assert_eq!(event.resource_name(), "strat-7");

        let event = MonitorEvent::from(backtest(None));
        assert_eq!(event.resource_id(), "bt-1");
    }

    #[test]
    fn test_payload_is_tagged() {
        let event = MonitorEvent::from(BotStatusEvent {
            bot_id: "bot-1".to_string(),
            bot_name: String::new(),
            owner_id: "org-1".to_string(),
            old_status: "running".to_string(),
            new_status: "error".to_string(),
            timestamp: Utc::now(),
        });

        let payload = event.payload();
        assert_eq!(payload["event_type"], "bot_status");
        assert_eq!(payload["new_status"], "error");
        assert_eq!(event.resource_name(), "bot-1");

        let parsed: MonitorEvent = serde_json::from_value(payload).unwrap();
        assert_eq!(parsed, event);
    }
}
