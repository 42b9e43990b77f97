use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::time::interval;

use crate::metrics::RATE_LIMIT_ENTRIES;

// Rate limit entry - tracks accepted increments per client IP
#[derive(Debug, Clone)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
}

/// Fixed-window limiter keyed by client IP.
///
/// Each check runs under the DashMap shard lock for that key, so concurrent
/// requests from one IP never lose an update to `count`.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    limit: u32,       // max accepted per window
    window: Duration, // window length
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
        }
    }

    // true = allowed (and counted), false = over the limit
    pub fn check(&self, ip: &str) -> bool {
        self.check_at(ip, Instant::now())
    }

    pub fn check_at(&self, ip: &str, now: Instant) -> bool {
        let mut entry = self
            .entries
            .entry(ip.to_string())
            .or_insert_with(|| RateLimitEntry {
                count: 0,
                reset_at: now + self.window,
            });

        // window over? start a new one
        if now > entry.reset_at {
            entry.count = 0;
            entry.reset_at = now + self.window;
        }

        if entry.count >= self.limit {
            return false;
        }

        entry.count += 1;
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry whose window has ended. An expired entry would be
    /// reset on its next check anyway, so removing it changes no decision.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Instant::now())
    }

    pub fn evict_expired_at(&self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| now <= entry.reset_at);
        before.saturating_sub(self.entries.len())
    }
}

// Background eviction loop, runs until the task is aborted
pub async fn eviction_sweeper(limiter: Arc<RateLimiter>, sweep_interval: Duration) {
    let mut interval = interval(sweep_interval);

    tracing::info!(interval = ?sweep_interval, "rate limit sweeper started");

    loop {
        interval.tick().await;

        let evicted = limiter.evict_expired();
        RATE_LIMIT_ENTRIES.set(limiter.len() as f64);

        if evicted > 0 {
            tracing::debug!(evicted, remaining = limiter.len(), "evicted expired rate limit entries");
        }
    }
}
