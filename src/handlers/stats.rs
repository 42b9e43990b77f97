use axum::{
    Json,
    extract::State,
    http::{HeaderName, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::allowlist::Namespace;
use crate::error::AppError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, STATS_REQUESTS, STORE_LATENCY};
use crate::models::{StatsResponse, VisitorStats};
use crate::state::AppState;

pub const X_SOURCE: HeaderName = HeaderName::from_static("x-source");

// GET /api/metrics/stats
pub async fn stats_handler(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    STATS_REQUESTS.inc();

    // check cache first
    if let Some(cached) = state.cache.get_fresh().await {
        CACHE_HITS.inc();
        tracing::debug!("stats cache hit");
        return Ok(([(X_SOURCE, "Cache")], Json(cached)).into_response());
    }
    CACHE_MISSES.inc();
    tracing::debug!("stats cache miss, reading store");

    let generation = state.cache.generation().await;

    let timer = STORE_LATENCY.start_timer();
    let (sources, paths) = tokio::try_join!(
        state.store.read_namespace(Namespace::Sources),
        state.store.read_namespace(Namespace::Paths),
    )
    .map_err(|e| {
        tracing::error!(operation = "read_stats", error = %e, "counter read failed");
        AppError::StoreRead(e)
    })?;
    timer.observe_duration();

    let response = StatsResponse {
        visitor_stats: VisitorStats::from_namespaces(&sources, &paths),
        timestamp: chrono::Utc::now().timestamp_millis(),
    };

    if !state.cache.store(response.clone(), generation).await {
        tracing::debug!("counters changed during read, snapshot not cached");
    }

    let cache_control = format!("public, max-age={}", state.cache.ttl().as_secs());
    Ok((
        [(X_SOURCE, "Live".to_string()), (CACHE_CONTROL, cache_control)],
        Json(response),
    )
        .into_response())
}
