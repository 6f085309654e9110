//! Request pacing
//!
//! A single limiter is shared by every fetch of a crawl. Callers reserve the
//! next free slot under a short lock and then sleep until it arrives, so
//! concurrent fetches queue up behind each other instead of bursting.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// Enforces a minimum interval between consecutive request starts
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter allowing at most `requests_per_second` request starts
    ///
    /// Non-positive or non-finite rates disable pacing.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second.is_finite() && requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        Self::from_interval(min_interval)
    }

    pub fn from_interval(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_slot: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until the caller may start a request
    ///
    /// The first call returns immediately. Each later call returns no earlier
    /// than `min_interval` after the slot granted to the previous caller.
    pub async fn wait(&self) {
        let slot = {
            let mut last = self.last_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = match *last {
                Some(prev) => (prev + self.min_interval).max(now),
                None => now,
            };
            *last = Some(slot);
            slot
        };

        if slot > Instant::now() {
            tracing::trace!("Rate limiter sleeping {:?}", slot - Instant::now());
            tokio::time::sleep_until(slot).await;
        }
    }
}
