use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};


lazy_static! {
    pub static ref STATS_REQUESTS: Counter =
        register_counter!("portfolio_stats_requests_total", "Total stats reads").unwrap();
    pub static ref TRACK_OUTCOMES: CounterVec = register_counter_vec!(
        "portfolio_track_requests_total",
        "Track requests by outcome",
        &["outcome"]
    )
    .unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("portfolio_cache_hits_total", "Total stats cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("portfolio_cache_misses_total", "Total stats cache misses").unwrap();
    pub static ref STORE_LATENCY: Histogram = register_histogram!(
        "portfolio_store_latency_seconds",
        "Counter store round-trip latency in seconds"
    )
    .unwrap();
    pub static ref RATE_LIMIT_ENTRIES: Gauge =
        register_gauge!("portfolio_rate_limit_entries", "Client IPs currently tracked").unwrap();
}

// Outcome labels for TRACK_OUTCOMES
pub const OUTCOME_UPDATED: &str = "updated";
pub const OUTCOME_BOT: &str = "ignored_bot";
pub const OUTCOME_RATE_LIMITED: &str = "rate_limited";
pub const OUTCOME_INVALID: &str = "invalid_target";
pub const OUTCOME_FAILED: &str = "failed";
