//! Client-side local rate budget.
//!
//! Approximates a target rate per key (the target URL) before any request
//! leaves the process. Each key keeps a log of recent grants; a grant stops
//! counting once it is older than the accounting period, so the budget rolls
//! rather than resetting on fixed boundaries.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone, Copy)]
struct Grant {
    at: Instant,
    weight: u32,
}

#[derive(Debug, Default)]
struct KeyLedger {
    grants: VecDeque<Grant>,
    in_window: u32,
}

impl KeyLedger {
    fn expire(&mut self, now: Instant, period: Duration) {
        while let Some(front) = self.grants.front() {
            if now.saturating_duration_since(front.at) >= period {
                self.in_window -= front.weight;
                self.grants.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Rolling-window permit budget shared by every request to the same key.
///
/// Within any `period`-long span the weight granted for one key never exceeds
/// `rate`. Decisions for all keys are serialized through one mutex, so two
/// concurrent callers can never both take the last permit.
pub struct RateBudget {
    rate: u32,
    period: Duration,
    ledgers: Mutex<HashMap<String, KeyLedger>>,
}

impl RateBudget {
    /// Creates a budget of `rate` permits per `period` for each key.
    pub fn new(rate: u32, period: Duration) -> Self {
        RateBudget {
            rate,
            period,
            ledgers: Mutex::new(HashMap::new()),
        }
    }

    /// Permits per period for each key.
    pub fn rate(&self) -> u32 {
        self.rate
    }

    /// Length of the rolling accounting period.
    pub fn period(&self) -> Duration {
        self.period
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, KeyLedger>> {
        self.ledgers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Takes `weight` permits for `key` if the budget allows it right now.
    pub fn try_acquire(&self, key: &str, weight: u32) -> bool {
        self.try_acquire_at(key, weight, Instant::now())
    }

    /// How long until `weight` permits for `key` could be granted.
    ///
    /// Zero when they are available now. A weight above `rate` can never be
    /// granted; the full period is reported for it.
    pub fn time_until_next_permit(&self, key: &str, weight: u32) -> Duration {
        self.time_until_next_permit_at(key, weight, Instant::now())
    }

    pub(crate) fn try_acquire_at(&self, key: &str, weight: u32, now: Instant) -> bool {
        if weight > self.rate {
            return false;
        }

        let mut ledgers = self.lock();
        let ledger = ledgers.entry(key.to_owned()).or_default();
        ledger.expire(now, self.period);

        if ledger.in_window + weight > self.rate {
            return false;
        }

        ledger.grants.push_back(Grant { at: now, weight });
        ledger.in_window += weight;
        true
    }

    pub(crate) fn time_until_next_permit_at(&self, key: &str, weight: u32, now: Instant) -> Duration {
        if weight > self.rate {
            return self.period;
        }

        let mut ledgers = self.lock();
        let Some(ledger) = ledgers.get_mut(key) else {
            return Duration::ZERO;
        };
        ledger.expire(now, self.period);

        let needed = (ledger.in_window + weight).saturating_sub(self.rate);
        if needed == 0 {
            return Duration::ZERO;
        }

        // Oldest grants expire first; find the one whose expiry frees enough
        let mut freed = 0;
        for grant in &ledger.grants {
            freed += grant.weight;
            if freed >= needed {
                return match grant.at.checked_add(self.period) {
                    Some(expires) => expires.saturating_duration_since(now),
                    None => self.period,
                };
            }
        }
        self.period
    }
}
