//! Rule matching
//!
//! The evaluator loads the candidate rules for an event's resource, applies
//! each rule's trigger predicate and decides, per `(rule, resource)`, whether
//! the cooldown window suppresses the match.

use super::conditions::Trigger;
use super::cooldown::CooldownGuard;
use super::events::MonitorEvent;
use super::types::AlertRule;
use crate::storage::AlertStore;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, warn};

/// What the dispatcher should do with a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Deliver through the rule's delivery mode
    Deliver,
    /// Inside the cooldown window; only an audit row is written
    Suppressed,
}

/// One rule that matched one event
#[derive(Debug, Clone)]
pub struct RuleMatch {
    pub rule: AlertRule,
    pub trigger: Trigger,
    pub event: MonitorEvent,
    pub outcome: MatchOutcome,
    occurred_at: DateTime<Utc>,
}

impl RuleMatch {
    pub fn resource_id(&self) -> &str {
        self.event.resource_id()
    }

    /// Event time, capped at evaluation time. The cooldown reservation and
    /// the audit row both use it.
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn is_suppressed(&self) -> bool {
        self.outcome == MatchOutcome::Suppressed
    }
}

/// Matches events against stored rules
#[derive(Debug, Clone)]
pub struct Evaluator {
    store: Arc<dyn AlertStore>,
    cooldowns: Arc<CooldownGuard>,
}

impl Evaluator {
    pub fn new(store: Arc<dyn AlertStore>, cooldowns: Arc<CooldownGuard>) -> Self {
        Self { store, cooldowns }
    }

    /// Find every rule that matches `event`, in rule creation order.
    ///
    /// Only a failure to load the candidate rules is returned as an error.
    /// Per-rule problems are logged and the rule skipped.
    pub async fn match_event(&self, event: &MonitorEvent) -> Result<Vec<RuleMatch>> {
        let resource_id = event.resource_id();
        // A monitor clock running ahead must not push cooldowns into the future
        let occurred_at = event.timestamp().min(Utc::now());
        let candidates = self
            .store
            .find_candidate_rules(resource_id, event.owner_id(), event.resource_type())
            .await?;

        debug!(
            event = event.kind(),
            resource_id,
            candidates = candidates.len(),
            "Evaluating alert rules"
        );

        let mut matches = Vec::new();
        for rule in candidates {
            if rule.is_inert() {
                debug!(rule_id = %rule.id, "Skipping rule without recipients");
                continue;
            }

            let trigger = match rule.trigger() {
                Ok(trigger) => trigger,
                Err(e) => {
                    warn!(rule_id = %rule.id, error = %e, "Skipping rule with invalid conditions");
                    continue;
                }
            };

            if !trigger.matches(event) {
                continue;
            }

            let outcome = match self.cooldown_outcome(&rule, resource_id, occurred_at).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(
                        rule_id = %rule.id,
                        resource_id,
                        error = %e,
                        "Could not read cooldown state, skipping rule"
                    );
                    continue;
                }
            };

            if outcome == MatchOutcome::Suppressed {
                debug!(rule_id = %rule.id, resource_id, "Alert suppressed by cooldown");
            }

            matches.push(RuleMatch {
                rule,
                trigger,
                event: event.clone(),
                outcome,
                occurred_at,
            });
        }

        Ok(matches)
    }

    async fn cooldown_outcome(
        &self,
        rule: &AlertRule,
        resource_id: &str,
        at: DateTime<Utc>,
    ) -> Result<MatchOutcome> {
        if rule.cooldown_seconds == 0 {
            return Ok(MatchOutcome::Deliver);
        }

        let last = self
            .store
            .latest_delivered_event(&rule.id, resource_id)
            .await?
            .map(|row| row.timestamp);

        let acquired = self.cooldowns.try_acquire(
            &rule.id,
            resource_id,
            at,
            rule.cooldown(),
            last,
        );

        Ok(if acquired {
            MatchOutcome::Deliver
        } else {
            MatchOutcome::Suppressed
        })
    }
}
