//! Typed rule conditions
//!
//! Rules store their conditions as JSON next to a `trigger_type`. Every
//! trigger type has its own schema; [`Trigger::parse`] turns the pair into a
//! validated variant so evaluation never inspects untyped maps.

use super::events::MonitorEvent;
use super::types::TriggerType;
use crate::utils::error::{AlertError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which side of zero a percentage threshold watches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Loss,
    Gain,
    Both,
}

impl Direction {
    /// `threshold` is a positive magnitude
    pub fn crosses(&self, value: f64, threshold: f64) -> bool {
        match self {
            Direction::Loss => value <= -threshold,
            Direction::Gain => value >= threshold,
            Direction::Both => value.abs() >= threshold,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusChangeConditions {
    pub trigger_on: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConditions {
    pub threshold_percent: f64,
    #[serde(default)]
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrawdownConditions {
    pub max_drawdown_percent: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradeClosedConditions {
    /// Only trades on these pairs; empty means every pair
    #[serde(default)]
    pub pairs: Vec<String>,
    /// Ignore trades whose absolute profit is below this percentage
    #[serde(default)]
    pub min_abs_profit_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConditions {
    #[serde(default = "default_backtest_statuses")]
    pub statuses: Vec<String>,
}

impl Default for BacktestConditions {
    fn default() -> Self {
        Self {
            statuses: default_backtest_statuses(),
        }
    }
}

fn default_backtest_statuses() -> Vec<String> {
    vec!["completed".to_string(), "failed".to_string()]
}

/// A rule's trigger with its validated conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "trigger_type", content = "conditions", rename_all = "snake_case")]
pub enum Trigger {
    StatusChange(StatusChangeConditions),
    LargeProfitLoss(ThresholdConditions),
    DrawdownThreshold(DrawdownConditions),
    DailyLossLimit(ThresholdConditions),
    TradeClosed(TradeClosedConditions),
    BacktestCompleted(BacktestConditions),
}

impl Trigger {
    /// Parse and validate `conditions` against the schema of `trigger_type`
    pub fn parse(trigger_type: TriggerType, conditions: &serde_json::Value) -> Result<Self> {
        let trigger = match trigger_type {
            TriggerType::StatusChange => Trigger::StatusChange(decode(trigger_type, conditions)?),
            TriggerType::LargeProfitLoss => {
                Trigger::LargeProfitLoss(decode(trigger_type, conditions)?)
            }
            TriggerType::DrawdownThreshold => {
                Trigger::DrawdownThreshold(decode(trigger_type, conditions)?)
            }
            TriggerType::DailyLossLimit => {
                Trigger::DailyLossLimit(decode(trigger_type, conditions)?)
            }
            TriggerType::TradeClosed => Trigger::TradeClosed(decode(trigger_type, conditions)?),
            TriggerType::BacktestCompleted => {
                Trigger::BacktestCompleted(decode(trigger_type, conditions)?)
            }
        };

        trigger.validate()?;
        Ok(trigger)
    }

    pub fn trigger_type(&self) -> TriggerType {
        match self {
            Trigger::StatusChange(_) => TriggerType::StatusChange,
            Trigger::LargeProfitLoss(_) => TriggerType::LargeProfitLoss,
            Trigger::DrawdownThreshold(_) => TriggerType::DrawdownThreshold,
            Trigger::DailyLossLimit(_) => TriggerType::DailyLossLimit,
            Trigger::TradeClosed(_) => TriggerType::TradeClosed,
            Trigger::BacktestCompleted(_) => TriggerType::BacktestCompleted,
        }
    }

    fn validate(&self) -> Result<()> {
        match self {
            Trigger::StatusChange(c) => {
                if c.trigger_on.iter().all(|s| s.trim().is_empty()) {
                    return Err(AlertError::validation(
                        "status_change conditions need at least one status in trigger_on",
                    ));
                }
            }
            Trigger::LargeProfitLoss(c) | Trigger::DailyLossLimit(c) => {
                positive_percent("threshold_percent", c.threshold_percent)?;
            }
            Trigger::DrawdownThreshold(c) => {
                positive_percent("max_drawdown_percent", c.max_drawdown_percent)?;
                if c.max_drawdown_percent > 100.0 {
                    return Err(AlertError::validation(
                        "max_drawdown_percent cannot exceed 100",
                    ));
                }
            }
            Trigger::TradeClosed(c) => {
                if let Some(min) = c.min_abs_profit_percent {
                    if !min.is_finite() || min < 0.0 {
                        return Err(AlertError::validation(
                            "min_abs_profit_percent must be a non-negative number",
                        ));
                    }
                }
            }
            Trigger::BacktestCompleted(c) => {
                if c.statuses.is_empty() {
                    return Err(AlertError::validation(
                        "backtest_completed conditions need at least one status",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Evaluate the trigger predicate against an event.
    ///
    /// Triggers that do not apply to the event kind never match.
    pub fn matches(&self, event: &MonitorEvent) -> bool {
        match (self, event) {
            (Trigger::StatusChange(c), MonitorEvent::BotStatus(e)) => c
                .trigger_on
                .iter()
                .any(|status| status.trim().eq_ignore_ascii_case(e.new_status.trim())),
            (Trigger::LargeProfitLoss(c), MonitorEvent::Trade(e)) => {
                c.direction.crosses(e.profit_percent, c.threshold_percent)
            }
            (Trigger::DailyLossLimit(c), MonitorEvent::Trade(e)) => e
                .daily_profit_percent
                .is_some_and(|daily| c.direction.crosses(daily, c.threshold_percent)),
            (Trigger::DrawdownThreshold(c), MonitorEvent::Trade(e)) => e
                .drawdown_percent
                .is_some_and(|dd| dd.abs() >= c.max_drawdown_percent),
            (Trigger::TradeClosed(c), MonitorEvent::Trade(e)) => {
                let pair_ok =
                    c.pairs.is_empty() || c.pairs.iter().any(|p| p.eq_ignore_ascii_case(&e.pair));
                let profit_ok = c
                    .min_abs_profit_percent
                    .is_none_or(|min| e.profit_percent.abs() >= min);
                pair_ok && profit_ok
            }
            (Trigger::BacktestCompleted(c), MonitorEvent::Backtest(e)) => c
                .statuses
                .iter()
                .any(|status| status.eq_ignore_ascii_case(&e.status)),
            _ => false,
        }
    }
}

fn decode<T: DeserializeOwned>(trigger_type: TriggerType, conditions: &serde_json::Value) -> Result<T> {
    // Absent conditions are an empty object so optional-only schemas accept them
    let value = if conditions.is_null() {
        serde_json::Value::Object(serde_json::Map::new())
    } else {
        conditions.clone()
    };

    serde_json::from_value(value).map_err(|e| {
        AlertError::validation(format!("Invalid conditions for {}: {}", trigger_type, e))
    })
}

fn positive_percent(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(AlertError::validation(format!(
            "{} must be a positive number, got {}",
            field, value
        )));
    }
    Ok(())
}
