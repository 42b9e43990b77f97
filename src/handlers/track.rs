use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header::USER_AGENT},
};
use std::sync::Arc;

use crate::allowlist::MetricTarget;
use crate::bot::is_bot;
use crate::client_ip::ClientIp;
use crate::error::AppError;
use crate::metrics::{
    OUTCOME_BOT, OUTCOME_FAILED, OUTCOME_INVALID, OUTCOME_RATE_LIMITED, OUTCOME_UPDATED,
    RATE_LIMIT_ENTRIES, STORE_LATENCY, TRACK_OUTCOMES,
};
use crate::models::{TrackRequest, TrackResponse};
use crate::state::AppState;

// POST /api/metrics/track
//
// Order matters: bot filter, then rate limit, then allowlist. A rejected
// target still uses up one of the caller's slots.
pub async fn track_handler(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<TrackResponse>, AppError> {
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    // bots get a success so the filter stays invisible
    if is_bot(user_agent) {
        TRACK_OUTCOMES.with_label_values(&[OUTCOME_BOT]).inc();
        tracing::debug!(%user_agent, "ignoring bot traffic");
        return Ok(Json(TrackResponse::ignored_bot()));
    }

    let allowed = state.rate_limiter.check(&ip);
    RATE_LIMIT_ENTRIES.set(state.rate_limiter.len() as f64);
    if !allowed {
        TRACK_OUTCOMES.with_label_values(&[OUTCOME_RATE_LIMITED]).inc();
        tracing::warn!(%ip, "rate limit exceeded");
        return Err(AppError::RateLimited);
    }

    // anything unparseable is just an invalid target
    let request: TrackRequest = serde_json::from_slice(&body).unwrap_or_default();
    let target = MetricTarget::parse(
        request.kind.as_deref().unwrap_or_default(),
        request.field.as_deref().unwrap_or_default(),
    )
    .inspect_err(|_| {
        TRACK_OUTCOMES.with_label_values(&[OUTCOME_INVALID]).inc();
    })?;

    let timer = STORE_LATENCY.start_timer();
    let value = state.store.increment(&target).await.map_err(|e| {
        TRACK_OUTCOMES.with_label_values(&[OUTCOME_FAILED]).inc();
        tracing::error!(operation = "increment", path = %target.path(), error = %e, "counter write failed");
        AppError::StoreWrite(e)
    })?;
    timer.observe_duration();

    // the snapshot is out of date now
    state.cache.invalidate().await;

    TRACK_OUTCOMES.with_label_values(&[OUTCOME_UPDATED]).inc();
    tracing::info!(path = %target.path(), value, "counter incremented");

    Ok(Json(TrackResponse::updated(target.field())))
}
