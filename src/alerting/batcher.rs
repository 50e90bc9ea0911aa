//! Digest batching
//!
//! Matches of batched rules are queued per `(rule, recipient set)` and sent as
//! one digest per bucket on every flush.

use super::channels::{Channel, Message, send_with_deadline};
use super::cooldown::CooldownGuard;
use super::templates::{self, AlertContent, DigestLine};
use super::types::{AlertRule, DeliveryStatus, Severity};
use crate::storage::AlertStore;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Identifies a digest: one rule sending to one recipient set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BatchKey {
    pub rule_id: String,
    /// Sorted and deduplicated
    pub recipients: Vec<String>,
}

impl BatchKey {
    pub fn new(rule_id: impl Into<String>, recipients: &[String]) -> Self {
        let mut recipients = recipients.to_vec();
        recipients.sort();
        recipients.dedup();
        Self {
            rule_id: rule_id.into(),
            recipients,
        }
    }

    pub fn for_rule(rule: &AlertRule) -> Self {
        Self::new(rule.id.clone(), &rule.recipients)
    }
}

/// A queued alert waiting for the next digest
#[derive(Debug, Clone, PartialEq)]
pub struct BatchEntry {
    /// Audit row to update once the digest outcome is known
    pub event_id: String,
    pub rule_id: String,
    pub resource_id: String,
    pub occurred_at: DateTime<Utc>,
    pub content: AlertContent,
    /// Failed digest sends this entry has been part of
    pub attempts: u32,
}

#[derive(Debug)]
struct Bucket {
    rule_name: String,
    severity: Severity,
    entries: VecDeque<BatchEntry>,
}

/// Counts from one flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub digests_sent: usize,
    pub digests_failed: usize,
    pub alerts_delivered: usize,
    pub alerts_requeued: usize,
    pub alerts_failed: usize,
}

impl FlushReport {
    pub fn is_empty(&self) -> bool {
        self.digests_sent == 0 && self.digests_failed == 0
    }
}

/// Accumulates batched alerts and sends them as digests
#[derive(Debug)]
pub struct Batcher {
    buckets: Mutex<HashMap<BatchKey, Bucket>>,
    /// Buckets taken by a flush whose send has not finished yet. They stay
    /// here if that flush is cancelled, so `drain` still sees them.
    in_flight: Mutex<HashMap<u64, (BatchKey, Bucket)>>,
    next_flight: AtomicU64,
    store: Arc<dyn AlertStore>,
    channel: Arc<dyn Channel>,
    cooldowns: Arc<CooldownGuard>,
    send_timeout: Duration,
    max_attempts: u32,
}

impl Batcher {
    pub fn new(
        store: Arc<dyn AlertStore>,
        channel: Arc<dyn Channel>,
        cooldowns: Arc<CooldownGuard>,
        send_timeout: Duration,
        max_attempts: u32,
    ) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            next_flight: AtomicU64::new(0),
            store,
            channel,
            cooldowns,
            send_timeout,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Queue an alert for the rule's next digest
    pub fn enqueue(&self, rule: &AlertRule, entry: BatchEntry) {
        let key = BatchKey::for_rule(rule);
        let mut buckets = self.buckets.lock();
        let bucket = buckets.entry(key).or_insert_with(|| Bucket {
            rule_name: rule.name.clone(),
            severity: rule.severity,
            entries: VecDeque::new(),
        });
        bucket.rule_name = rule.name.clone();
        bucket.severity = rule.severity;
        bucket.entries.push_back(entry);
    }

    /// Send one digest per non-empty bucket.
    ///
    /// Cancelling the returned future leaves unsent buckets in flight, where
    /// [`Batcher::drain`] picks them up.
    pub async fn flush(&self) -> FlushReport {
        let flights: Vec<u64> = {
            let mut buckets = self.buckets.lock();
            let mut in_flight = self.in_flight.lock();
            std::mem::take(&mut *buckets)
                .into_iter()
                .filter(|(_, bucket)| !bucket.entries.is_empty())
                .map(|(key, bucket)| {
                    let flight = self.next_flight.fetch_add(1, Ordering::Relaxed);
                    in_flight.insert(flight, (key, bucket));
                    flight
                })
                .collect()
        };

        let mut report = FlushReport::default();
        for flight in flights {
            self.flush_bucket(flight, &mut report).await;
        }

        if !report.is_empty() {
            info!(
                digests_sent = report.digests_sent,
                digests_failed = report.digests_failed,
                alerts_delivered = report.alerts_delivered,
                alerts_requeued = report.alerts_requeued,
                alerts_failed = report.alerts_failed,
                "Alert digests flushed"
            );
        }
        report
    }

    fn digest_message(&self, flight: u64) -> Option<Message> {
        let in_flight = self.in_flight.lock();
        let (key, bucket) = in_flight.get(&flight)?;
        let lines: Vec<DigestLine<'_>> = bucket
            .entries
            .iter()
            .map(|entry| DigestLine {
                occurred_at: entry.occurred_at,
                resource_id: &entry.resource_id,
                content: &entry.content,
            })
            .collect();

        Some(
            templates::render_digest(&bucket.rule_name, bucket.severity, &lines)
                .into_message(key.recipients.clone())
                .with_metadata("rule_id", key.rule_id.clone())
                .with_metadata("alert_count", lines.len().to_string()),
        )
    }

    async fn flush_bucket(&self, flight: u64, report: &mut FlushReport) {
        let Some(message) = self.digest_message(flight) else {
            return;
        };

        let outcome = send_with_deadline(self.channel.as_ref(), &message, self.send_timeout).await;

        // Gone when a shutdown drained it while the send was running
        let Some((key, bucket)) = self.in_flight.lock().remove(&flight) else {
            return;
        };
        let count = bucket.entries.len();

        match outcome {
            Ok(()) => {
                debug!(rule_id = %key.rule_id, alerts = count, "Digest sent");
                report.digests_sent += 1;
                report.alerts_delivered += count;
                for entry in &bucket.entries {
                    if let Err(e) = self
                        .store
                        .update_event_status(&entry.event_id, DeliveryStatus::Sent, None)
                        .await
                    {
                        warn!(event_id = %entry.event_id, error = %e, "Failed to mark digest entry as sent");
                    }
                }
            }
            Err(e) => {
                warn!(rule_id = %key.rule_id, alerts = count, error = %e, "Digest delivery failed");
                report.digests_failed += 1;
                self.handle_failed_digest(key, bucket, &e.to_string(), report)
                    .await;
            }
        }
    }

    async fn handle_failed_digest(
        &self,
        key: BatchKey,
        bucket: Bucket,
        reason: &str,
        report: &mut FlushReport,
    ) {
        let (retry, exhausted): (Vec<BatchEntry>, Vec<BatchEntry>) = bucket
            .entries
            .into_iter()
            .map(|mut entry| {
                entry.attempts += 1;
                entry
            })
            .partition(|entry| entry.attempts < self.max_attempts);

        // Requeue and log before the first await so a cancelled flush loses nothing
        if !retry.is_empty() {
            report.alerts_requeued += retry.len();
            let mut buckets = self.buckets.lock();
            let current = buckets.entry(key).or_insert_with(|| Bucket {
                rule_name: bucket.rule_name,
                severity: bucket.severity,
                entries: VecDeque::new(),
            });
            // Retried entries go ahead of anything enqueued during the send
            for entry in retry.into_iter().rev() {
                current.entries.push_front(entry);
            }
        }

        for entry in &exhausted {
            error!(
                rule_id = %entry.rule_id,
                resource_id = %entry.resource_id,
                event_id = %entry.event_id,
                attempts = entry.attempts,
                error = reason,
                "Giving up on batched alert"
            );
            self.cooldowns
                .release(&entry.rule_id, &entry.resource_id, entry.occurred_at);
        }
        report.alerts_failed += exhausted.len();

        for entry in &exhausted {
            if let Err(e) = self
                .store
                .update_event_status(&entry.event_id, DeliveryStatus::Failed, Some(reason))
                .await
            {
                warn!(event_id = %entry.event_id, error = %e, "Failed to mark batched alert as failed");
            }
        }
    }

    /// Remove and return every queued entry, including buckets whose flush
    /// was interrupted
    pub fn drain(&self) -> Vec<BatchEntry> {
        let (buckets, in_flight) = {
            let mut buckets = self.buckets.lock();
            let mut in_flight = self.in_flight.lock();
            (
                std::mem::take(&mut *buckets),
                std::mem::take(&mut *in_flight),
            )
        };

        let mut interrupted: Vec<(u64, (BatchKey, Bucket))> = in_flight.into_iter().collect();
        interrupted.sort_by_key(|(flight, _)| *flight);
        interrupted
            .into_iter()
            .map(|(_, pending)| pending)
            .chain(buckets)
            .flat_map(|(_, bucket)| bucket.entries)
            .collect()
    }

    /// Entries waiting across all buckets, in-flight digests included
    pub fn pending_len(&self) -> usize {
        let queued: usize = self
            .buckets
            .lock()
            .values()
            .map(|bucket| bucket.entries.len())
            .sum();
        let in_flight: usize = self
            .in_flight
            .lock()
            .values()
            .map(|(_, bucket)| bucket.entries.len())
            .sum();
        queued + in_flight
    }

    pub fn bucket_len(&self, key: &BatchKey) -> usize {
        self.buckets
            .lock()
            .get(key)
            .map_or(0, |bucket| bucket.entries.len())
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.lock().len()
    }
}
