//! Database integration tests
//!
//! Tests the SeaORM alert store using a real in-memory SQLite database.

#[cfg(test)]
mod tests {
    use crate::common::{RuleFactory, TestDatabase};
    use crate::{assert_err, assert_ok};
    use botwatch_alerts::config::DatabaseConfig;
    use botwatch_alerts::storage::SeaOrmAlertStore;
    use botwatch_alerts::storage::database::DatabaseBackendType;
    use botwatch_alerts::{
        AlertError, AlertEvent, AlertStore, ChannelType, DeliveryStatus, ResourceType, RuleBinding,
    };
    use chrono::{Duration, Utc};
    use serde_json::json;

    /// Test basic database connection and health check
    #[tokio::test]
    async fn test_database_health_check() {
        let db = TestDatabase::new().await;
        assert_eq!(db.store().backend_type(), DatabaseBackendType::SQLite);

        let health = db.store().health_check().await;
        assert!(health.is_ok(), "Health check failed: {:?}", health.err());
    }

    /// Migrations can run again on an up-to-date schema
    #[tokio::test]
    async fn test_database_migration_is_idempotent() {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            connection_timeout: 5,
        };

        let store = SeaOrmAlertStore::connect(&config)
            .await
            .expect("Failed to create database");
        assert_ok!(store.migrate().await);
        assert_ok!(store.migrate().await);
    }

    #[tokio::test]
    async fn test_rule_round_trip() {
        let db = TestDatabase::new().await;
        let store = db.store();

        let mut rule = RuleFactory::error_status("bot-1", 300).into_rule();
        rule.recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];
        assert_ok!(store.insert_rule(&rule).await);

        let loaded = assert_ok!(store.get_rule(&rule.id).await).expect("rule should exist");
        assert_eq!(loaded.id, rule.id);
        assert_eq!(loaded.name, rule.name);
        assert_eq!(loaded.binding, RuleBinding::resource("bot-1"));
        assert_eq!(loaded.trigger_type, rule.trigger_type);
        assert_eq!(loaded.conditions, json!({"trigger_on": ["error"]}));
        assert_eq!(loaded.severity, rule.severity);
        assert_eq!(loaded.delivery_mode, rule.delivery_mode);
        assert_eq!(loaded.cooldown_seconds, 300);
        assert_eq!(loaded.recipients, rule.recipients);
        assert!(loaded.enabled);

        let mut updated = loaded.clone();
        updated.enabled = false;
        updated.name = "Renamed".to_string();
        assert_ok!(store.update_rule(&updated).await);
        let reloaded = assert_ok!(store.get_rule(&rule.id).await).expect("rule should exist");
        assert!(!reloaded.enabled);
        assert_eq!(reloaded.name, "Renamed");

        assert_ok!(store.delete_rule(&rule.id).await);
        assert!(assert_ok!(store.get_rule(&rule.id).await).is_none());
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let db = TestDatabase::new().await;
        let store = db.store();
        let rule = RuleFactory::error_status("bot-1", 0).into_rule();

        let err = assert_err!(store.update_rule(&rule).await);
        assert!(matches!(err, AlertError::NotFound(_)));
        let err = assert_err!(store.delete_rule(&rule.id).await);
        assert!(matches!(err, AlertError::NotFound(_)));
        let err = assert_err!(
            store
                .update_event_status("missing", DeliveryStatus::Sent, None)
                .await
        );
        assert!(matches!(err, AlertError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_candidate_rules_follow_binding_and_creation_order() {
        let db = TestDatabase::new().await;
        let store = db.store();
        let base = Utc::now() - Duration::hours(1);

        let mut owner_rule = RuleFactory::trade_digest("org-1").into_rule();
        owner_rule.created_at = base;
        let mut direct_rule = RuleFactory::error_status("bot-1", 0).into_rule();
        direct_rule.created_at = base + Duration::minutes(1);
        let mut other_bot = RuleFactory::error_status("bot-2", 0).into_rule();
        other_bot.created_at = base + Duration::minutes(2);
        let mut disabled = RuleFactory::error_status("bot-1", 0).into_rule();
        disabled.enabled = false;
        let mut strategy_rule = RuleFactory::trade_digest("org-1").into_rule();
        strategy_rule.resource_type = ResourceType::Strategy;

        for rule in [&direct_rule, &other_bot, &disabled, &strategy_rule, &owner_rule] {
            assert_ok!(store.insert_rule(rule).await);
        }

        let candidates = assert_ok!(
            store
                .find_candidate_rules("bot-1", "org-1", ResourceType::Bot)
                .await
        );
        let ids: Vec<_> = candidates.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![owner_rule.id.clone(), direct_rule.id.clone()]);

        let listed = assert_ok!(store.list_rules(&RuleBinding::resource("bot-1")).await);
        assert_eq!(listed.len(), 2);
        let listed = assert_ok!(store.list_rules(&RuleBinding::owner("org-1")).await);
        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn test_audit_rows_and_cooldown_lookup() {
        let db = TestDatabase::new().await;
        let store = db.store();
        let now = Utc::now();

        let sent = AlertEvent::new(
            "rule-1",
            "bot-1",
            now - Duration::minutes(10),
            json!({"event_type": "bot_status"}),
            DeliveryStatus::Sent,
            ChannelType::Email,
        );
        let queued = AlertEvent::new(
            "rule-1",
            "bot-1",
            now - Duration::minutes(5),
            json!({}),
            DeliveryStatus::Queued,
            ChannelType::Email,
        );
        let suppressed = AlertEvent::new(
            "rule-1",
            "bot-1",
            now,
            json!({}),
            DeliveryStatus::Suppressed,
            ChannelType::Email,
        );
        let other_resource = AlertEvent::new(
            "rule-1",
            "bot-2",
            now,
            json!({}),
            DeliveryStatus::Sent,
            ChannelType::Email,
        );
        for event in [&sent, &queued, &suppressed, &other_resource] {
            assert_ok!(store.insert_event(event).await);
        }

        let latest = assert_ok!(store.latest_delivered_event("rule-1", "bot-1").await);
        assert_eq!(latest.map(|e| e.id), Some(queued.id.clone()));

        assert_ok!(
            store
                .update_event_status(&queued.id, DeliveryStatus::Failed, Some("SendGrid returned 500"))
                .await
        );
        let latest = assert_ok!(store.latest_delivered_event("rule-1", "bot-1").await)
            .expect("sent row remains");
        assert_eq!(latest.id, sent.id);
        assert_eq!(latest.payload, json!({"event_type": "bot_status"}));

        let rows = assert_ok!(store.list_events("rule-1", "bot-1", 10).await);
        let statuses: Vec<_> = rows.iter().map(|e| e.delivery_status).collect();
        assert_eq!(
            statuses,
            vec![DeliveryStatus::Suppressed, DeliveryStatus::Failed, DeliveryStatus::Sent]
        );
        assert_eq!(rows[1].error_message.as_deref(), Some("SendGrid returned 500"));

        let limited = assert_ok!(store.list_events("rule-1", "bot-1", 1).await);
        assert_eq!(limited.len(), 1);
    }
}
