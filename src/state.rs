use std::sync::Arc;
use std::time::Duration;

use crate::cache::StatsCache;
use crate::rate_limit::RateLimiter;
use crate::store::CounterStore;

// app's shared state, built once in main and handed to every handler
pub struct AppState {
    pub store: Arc<dyn CounterStore>,
    pub cache: StatsCache,                // single snapshot of all counters
    pub rate_limiter: Arc<RateLimiter>,   // shared with the eviction sweeper
}

impl AppState {
    pub fn new(
        store: Arc<dyn CounterStore>,
        cache_ttl: Duration,
        rate_limit: u32,
        rate_window: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache: StatsCache::new(cache_ttl),
            rate_limiter: Arc::new(RateLimiter::new(rate_limit, rate_window)),
        })
    }
}
