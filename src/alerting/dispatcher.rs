//! Alert dispatch
//!
//! Turns rule matches into audit rows and deliveries. The audit row is always
//! written before anything is sent.

use super::batcher::{BatchEntry, Batcher};
use super::channels::{Channel, send_with_deadline};
use super::cooldown::CooldownGuard;
use super::evaluator::{MatchOutcome, RuleMatch};
use super::templates;
use super::types::{AlertEvent, DeliveryMode, DeliveryStatus};
use crate::storage::AlertStore;
use crate::utils::error::{AlertError, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Outcome of dispatching a set of matches
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub sent: usize,
    pub queued: usize,
    pub suppressed: usize,
    pub failed: usize,
    /// Matches lost because their audit row could not be written
    pub dropped: usize,
    pub errors: Vec<AlertError>,
}

impl DispatchReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// `Err(Aggregate)` carrying every non-fatal error, if any
    pub fn into_result(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AlertError::Aggregate(self.errors))
        }
    }
}

/// Routes matches to immediate delivery or the batcher
#[derive(Debug, Clone)]
pub struct Dispatcher {
    store: Arc<dyn AlertStore>,
    channel: Arc<dyn Channel>,
    batcher: Arc<Batcher>,
    cooldowns: Arc<CooldownGuard>,
    send_timeout: Duration,
}

impl Dispatcher {
    pub fn new(
        store: Arc<dyn AlertStore>,
        channel: Arc<dyn Channel>,
        batcher: Arc<Batcher>,
        cooldowns: Arc<CooldownGuard>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            store,
            channel,
            batcher,
            cooldowns,
            send_timeout,
        }
    }

    /// Dispatch matches in order. Failures are collected, never raised.
    pub async fn process(&self, matches: Vec<RuleMatch>) -> DispatchReport {
        let mut report = DispatchReport::default();
        for rule_match in matches {
            match rule_match.outcome {
                MatchOutcome::Suppressed => self.record_suppressed(&rule_match, &mut report).await,
                MatchOutcome::Deliver => self.deliver(rule_match, &mut report).await,
            }
        }
        report
    }

    async fn record_suppressed(&self, rule_match: &RuleMatch, report: &mut DispatchReport) {
        let row = self.audit_row(rule_match, DeliveryStatus::Suppressed);
        match self.store.insert_event(&row).await {
            Ok(()) => report.suppressed += 1,
            Err(e) => {
                warn!(
                    rule_id = %rule_match.rule.id,
                    resource_id = rule_match.resource_id(),
                    error = %e,
                    "Failed to record suppressed alert"
                );
                report.dropped += 1;
                report.errors.push(e);
            }
        }
    }

    async fn deliver(&self, rule_match: RuleMatch, report: &mut DispatchReport) {
        let rule = &rule_match.rule;
        let resource_id = rule_match.resource_id();
        let content = templates::render(rule, &rule_match.event);

        let status = match rule.delivery_mode {
            DeliveryMode::Immediate => DeliveryStatus::Sent,
            DeliveryMode::Batched => DeliveryStatus::Queued,
        };
        let row = self.audit_row(&rule_match, status);

        if let Err(e) = self.store.insert_event(&row).await {
            error!(
                rule_id = %rule.id,
                resource_id,
                error = %e,
                "Failed to persist alert event, dropping alert"
            );
            self.cooldowns
                .release(&rule.id, resource_id, rule_match.occurred_at());
            report.dropped += 1;
            report.errors.push(e);
            return;
        }

        match rule.delivery_mode {
            DeliveryMode::Batched => {
                self.batcher.enqueue(
                    rule,
                    BatchEntry {
                        event_id: row.id,
                        rule_id: rule.id.clone(),
                        resource_id: resource_id.to_string(),
                        occurred_at: rule_match.occurred_at(),
                        content,
                        attempts: 0,
                    },
                );
                report.queued += 1;
            }
            DeliveryMode::Immediate => {
                let message = content
                    .into_message(rule.recipients.clone())
                    .with_metadata("rule_id", rule.id.clone())
                    .with_metadata("alert_event_id", row.id.clone());

                match send_with_deadline(self.channel.as_ref(), &message, self.send_timeout).await {
                    Ok(()) => {
                        info!(
                            rule_id = %rule.id,
                            resource_id,
                            severity = %rule.severity,
                            "Alert sent"
                        );
                        report.sent += 1;
                    }
                    Err(e) => {
                        warn!(rule_id = %rule.id, resource_id, error = %e, "Alert delivery failed");
                        let reason = e.to_string();
                        if let Err(update_err) = self
                            .store
                            .update_event_status(&row.id, DeliveryStatus::Failed, Some(&reason))
                            .await
                        {
                            warn!(
                                event_id = %row.id,
                                error = %update_err,
                                "Failed to mark alert event as failed"
                            );
                        }
                        self.cooldowns
                            .release(&rule.id, resource_id, rule_match.occurred_at());
                        report.failed += 1;
                        report.errors.push(AlertError::delivery(format!(
                            "Rule '{}' for {}: {}",
                            rule.name, resource_id, reason
                        )));
                    }
                }
            }
        }
    }

    fn audit_row(&self, rule_match: &RuleMatch, status: DeliveryStatus) -> AlertEvent {
        AlertEvent::new(
            rule_match.rule.id.clone(),
            rule_match.resource_id(),
            rule_match.occurred_at(),
            rule_match.event.payload(),
            status,
            self.channel.channel_type(),
        )
    }
}
