//! End-to-end alerting tests on the SeaORM store

#[cfg(test)]
mod tests {
    use crate::common::{EventFactory, RecordingChannel, RuleFactory, TestDatabase};
    use crate::assert_ok;
    use botwatch_alerts::auth::ResourceRole;
    use botwatch_alerts::config::AlertingConfig;
    use botwatch_alerts::{
        AlertManager, AlertRuleService, AlertStore, DeliveryStatus, RequestContext,
        ScopeRegistry, SelfHealingAuthorizer, TriggerType, seed_default_rules,
    };
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn manager(db: &TestDatabase, channel: Arc<RecordingChannel>) -> AlertManager {
        AlertManager::new(AlertingConfig::new(900), db.store_arc(), channel)
            .expect("Failed to build manager")
    }

    #[tokio::test]
    async fn test_cooldown_survives_manager_restart() {
        let db = TestDatabase::new().await;
        let rule = RuleFactory::error_status("bot-1", 300).into_rule();
        assert_ok!(db.store().insert_rule(&rule).await);
        let t0 = Utc::now() - Duration::hours(1);

        let channel = RecordingChannel::new();
        let first = manager(&db, channel.clone());
        let report = assert_ok!(
            first
                .dispatch_event(EventFactory::status("bot-1", "running", "error", t0).into())
                .await
        );
        assert_eq!(report.sent, 1);
        assert_eq!(channel.messages().len(), 1);
        assert!(channel.messages()[0].subject.starts_with("[CRITICAL]"));

        // A fresh manager has no in-process reservations and relies on the audit trail
        let second = manager(&db, channel.clone());
        let report = assert_ok!(
            second
                .dispatch_event(
                    EventFactory::status("bot-1", "running", "error", t0 + Duration::seconds(60))
                        .into()
                )
                .await
        );
        assert_eq!(report.sent, 0);
        assert_eq!(report.suppressed, 1);
        assert_eq!(channel.messages().len(), 1);

        let report = assert_ok!(
            second
                .dispatch_event(
                    EventFactory::status("bot-1", "running", "error", t0 + Duration::seconds(301))
                        .into()
                )
                .await
        );
        assert_eq!(report.sent, 1);

        let rows = assert_ok!(db.store().list_events(&rule.id, "bot-1", 10).await);
        let statuses: Vec<_> = rows.iter().map(|e| e.delivery_status).collect();
        assert_eq!(
            statuses,
            vec![DeliveryStatus::Sent, DeliveryStatus::Suppressed, DeliveryStatus::Sent]
        );
    }

    #[tokio::test]
    async fn test_batched_digest_marks_rows_sent() {
        let db = TestDatabase::new().await;
        let rule = RuleFactory::trade_digest("org-1").into_rule();
        assert_ok!(db.store().insert_rule(&rule).await);
        let channel = RecordingChannel::new();
        let manager = manager(&db, channel.clone());
        let t0 = Utc::now() - Duration::hours(1);

        for (i, pair) in ["BTC/USDT", "ETH/USDT", "SOL/USDT"].iter().enumerate() {
            let at = t0 + Duration::seconds(i as i64);
            assert_ok!(
                manager
                    .handle_trade(EventFactory::trade("bot-1", pair, 1.5, at))
                    .await
            );
        }
        assert_ok!(
            manager
                .handle_trade(EventFactory::trade("bot-2", "BTC/USDT", -0.5, t0))
                .await
        );
        assert!(channel.messages().is_empty());
        assert_eq!(manager.pending_alerts(), 4);

        let report = manager.flush_now().await;
        assert_eq!(report.digests_sent, 1);
        assert_eq!(report.alerts_delivered, 4);

        let messages = channel.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].recipients, vec!["desk@example.com".to_string()]);

        let bot_one = assert_ok!(db.store().list_events(&rule.id, "bot-1", 10).await);
        assert_eq!(bot_one.len(), 3);
        assert!(bot_one.iter().all(|e| e.delivery_status == DeliveryStatus::Sent));
        let bot_two = assert_ok!(db.store().list_events(&rule.id, "bot-2", 10).await);
        assert_eq!(bot_two.len(), 1);
        assert_eq!(bot_two[0].delivery_status, DeliveryStatus::Sent);
    }

    #[tokio::test]
    async fn test_seeded_rules_stay_inert() {
        let db = TestDatabase::new().await;
        let seeded = assert_ok!(seed_default_rules(db.store(), "bot-7").await);
        assert_eq!(seeded.len(), 3);

        let stored = assert_ok!(
            db.store()
                .list_rules(&botwatch_alerts::RuleBinding::resource("bot-7"))
                .await
        );
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.iter().filter(|r| r.enabled).count(), 1);

        // No recipients yet, so nothing is delivered or audited
        let channel = RecordingChannel::new();
        let manager = manager(&db, channel.clone());
        let report = assert_ok!(
            manager
                .dispatch_event(EventFactory::status("bot-7", "running", "error", Utc::now()).into())
                .await
        );
        assert_eq!(report.sent + report.queued + report.suppressed, 0);
        assert!(channel.messages().is_empty());
    }

    #[tokio::test]
    async fn test_rule_service_on_database() {
        let db = TestDatabase::new().await;
        let registry = Arc::new(ScopeRegistry::new());
        registry.register_resource("bot-1", "user-1");
        registry.grant("bot-1", "viewer-1", ResourceRole::Viewer);
        let service = AlertRuleService::new(
            db.store_arc(),
            SelfHealingAuthorizer::new(registry.clone()),
        );

        let owner = RequestContext::new().with_user_id("user-1");
        let created = assert_ok!(
            service
                .create_rule(&owner, RuleFactory::error_status("bot-1", 60))
                .await
        );
        assert_eq!(created.trigger_type, TriggerType::StatusChange);
        assert_eq!(registry.sync_count(), 1);

        let viewer = RequestContext::new().with_user_id("viewer-1");
        let fetched = assert_ok!(service.get_rule(&viewer, &created.id).await);
        assert_eq!(fetched.id, created.id);
        assert!(service.delete_rule(&viewer, &created.id).await.is_err());

        let toggled = assert_ok!(service.toggle_rule(&owner, &created.id, false).await);
        assert!(!toggled.enabled);
        let stored = assert_ok!(db.store().get_rule(&created.id).await).expect("rule exists");
        assert!(!stored.enabled);

        assert_ok!(service.delete_rule(&owner, &created.id).await);
        assert!(assert_ok!(db.store().get_rule(&created.id).await).is_none());
    }
}
