//! Admission control - per-buyer order rate limiting
//!
//! Evaluated before any seat lock is attempted, independent of the
//! ledger. Sliding hour/day windows per buyer; entries are pruned on
//! access.

use dashmap::DashMap;
use thiserror::Error;

const HOUR_MS: i64 = 60 * 60 * 1000;
const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct RateLimitExceeded(pub String);

/// Sliding-window rate limiter keyed by buyer id
#[derive(Debug)]
pub struct OrderRateLimiter {
    max_per_hour: u32,
    max_per_day: u32,
    /// Creation timestamps per buyer, newest last
    history: DashMap<String, Vec<i64>>,
}

impl OrderRateLimiter {
    pub fn new(max_per_hour: u32, max_per_day: u32) -> Self {
        Self {
            max_per_hour,
            max_per_day,
            history: DashMap::new(),
        }
    }

    /// Check whether `buyer_id` may open another order at `now`.
    ///
    /// Read-only: quota is consumed by [`record`](Self::record) once the
    /// order actually exists, so rejected checkouts cost nothing.
    pub fn check(&self, buyer_id: &str, now: i64) -> Result<(), RateLimitExceeded> {
        if let Some(mut entry) = self.history.get_mut(buyer_id) {
            entry.retain(|&t| now - t < DAY_MS);

            let day_count = entry.len() as u32;
            if day_count >= self.max_per_day {
                return Err(RateLimitExceeded(format!(
                    "max {} orders per day reached",
                    self.max_per_day
                )));
            }
            let hour_count = entry.iter().filter(|&&t| now - t < HOUR_MS).count() as u32;
            if hour_count >= self.max_per_hour {
                return Err(RateLimitExceeded(format!(
                    "max {} orders per hour reached",
                    self.max_per_hour
                )));
            }
        }
        Ok(())
    }

    /// Consume quota for a successfully created order
    pub fn record(&self, buyer_id: &str, now: i64) {
        self.history
            .entry(buyer_id.to_string())
            .or_default()
            .push(now);
    }
}
