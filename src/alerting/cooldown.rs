//! In-process cooldown reservations
//!
//! The durable cooldown source is the audit table, but reading the latest row
//! and writing the next one are two separate store calls. Two concurrent
//! evaluations of the same rule for the same resource could both pass the
//! read. The guard closes that window: the decision and the reservation are
//! made under the map shard lock for the `(rule, resource)` key.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

type CooldownKey = (String, String);

#[derive(Debug, Clone, Copy)]
struct Reservation {
    at: DateTime<Utc>,
    /// End of the window this reservation holds open
    until: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct CooldownGuard {
    reservations: DashMap<CooldownKey, Reservation>,
}

impl CooldownGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide whether a delivery at `at` may proceed and reserve the slot if so.
    ///
    /// `last_persisted` is the timestamp of the most recent audit row that
    /// counts toward the cooldown. Returns `false` when the match must be
    /// suppressed.
    pub fn try_acquire(
        &self,
        rule_id: &str,
        resource_id: &str,
        at: DateTime<Utc>,
        cooldown: Duration,
        last_persisted: Option<DateTime<Utc>>,
    ) -> bool {
        if cooldown <= Duration::zero() {
            return true;
        }

        match self
            .reservations
            .entry((rule_id.to_string(), resource_id.to_string()))
        {
            Entry::Occupied(mut entry) => {
                let reserved = entry.get().at;
                let last = match last_persisted {
                    Some(persisted) => persisted.max(reserved),
                    None => reserved,
                };
                if within(at, last, cooldown) {
                    false
                } else {
                    entry.insert(Reservation::new(at, cooldown));
                    true
                }
            }
            Entry::Vacant(entry) => {
                if last_persisted.is_some_and(|last| within(at, last, cooldown)) {
                    false
                } else {
                    entry.insert(Reservation::new(at, cooldown));
                    true
                }
            }
        }
    }

    /// Give back a reservation whose delivery did not happen.
    ///
    /// Only removes the reservation made at `at`, so a newer one is kept.
    pub fn release(&self, rule_id: &str, resource_id: &str, at: DateTime<Utc>) {
        self.reservations
            .remove_if(&(rule_id.to_string(), resource_id.to_string()), |_, reserved| {
                reserved.at == at
            });
    }

    /// Drop reservations whose window closed before `now`.
    ///
    /// Once a window has passed, the audit table alone gives the same answer,
    /// so this only bounds memory. Keys of deleted rules go the same way.
    pub fn prune_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.reservations.len();
        self.reservations.retain(|_, reservation| reservation.until > now);
        before.saturating_sub(self.reservations.len())
    }

    pub fn len(&self) -> usize {
        self.reservations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reservations.is_empty()
    }
}

impl Reservation {
    fn new(at: DateTime<Utc>, cooldown: Duration) -> Self {
        Self {
            at,
            until: at + cooldown,
        }
    }
}

/// Events older than the last delivery also fall inside the window
fn within(at: DateTime<Utc>, last: DateTime<Utc>, cooldown: Duration) -> bool {
    at.signed_duration_since(last) < cooldown
}
