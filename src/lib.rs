//! # botwatch-alerts
//!
//! Alerting engine for a multi-tenant bot and strategy monitoring platform.
//!
//! Monitors report domain events (bot status changes, closed trades, finished
//! backtests). The engine matches them against user-defined alert rules,
//! suppresses repeats inside each rule's cooldown window, records an audit
//! row for every match and delivers notifications either immediately or as
//! periodic digests.
//!
//! ## Features
//!
//! - **Typed rule conditions**: each trigger type has its own validated schema
//! - **Cooldowns**: tracked per rule and concrete resource, race-free within a process
//! - **Digests**: batched rules are flushed on a fixed, configured interval
//! - **Audit trail**: every match attempt is persisted with its delivery outcome
//! - **Self-healing authorization**: one scope sync and re-check on stale scopes
//! - **Storage**: SQLite or Postgres through SeaORM, or in memory
//!
//! ## Example
//!
//! ```rust,no_run
//! use botwatch_alerts::{AlertManager, ChannelRegistry, ChannelType, Config, SeaOrmAlertStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_file("config/alerts.yaml").await?;
//!     let store = SeaOrmAlertStore::connect(&config.database).await?;
//!     store.migrate().await?;
//!
//!     let channel = ChannelRegistry::from_config(&config)?.get(ChannelType::Email)?;
//!     let manager = Arc::new(AlertManager::new(config.alerting.clone(), Arc::new(store), channel)?);
//!     manager.start().await?;
//!     // hand events to manager.handle_event(..)
//!     manager.stop().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod alerting;
pub mod auth;
pub mod config;
pub mod storage;
pub mod utils;

// Re-export main types
pub use alerting::{
    AlertEvent, AlertManager, AlertRule, AlertRuleService, AlertRuleUpdate, BacktestEvent,
    BotStatusEvent, Channel, ChannelRegistry, ChannelType, DeliveryMode, DeliveryStatus,
    DispatchReport, Message, MonitorEvent, NewAlertRule, RequestContext, ResourceType,
    RuleBinding, SendGridChannel, Severity, TradeEvent, TriggerType, seed_default_rules,
};
pub use auth::{AuthorizationGateway, ScopeRegistry, SelfHealingAuthorizer};
pub use config::Config;
pub use storage::{AlertStore, InMemoryAlertStore, SeaOrmAlertStore};
pub use utils::error::{AlertError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
