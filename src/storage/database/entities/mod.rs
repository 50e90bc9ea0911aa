/// Alert rule entity module
pub mod alert_rule;
/// Alert audit row entity module
pub mod alert_event;

pub use alert_event::Entity as AlertEvent;
pub use alert_rule::Entity as AlertRule;
