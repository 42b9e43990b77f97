//! Visitor metrics API for the portfolio site.
//!
//! Two endpoints do the real work:
//! - `GET /api/metrics/stats` serves every counter, through a single
//!   snapshot cached for `--cache-ttl` seconds.
//! - `POST /api/metrics/track` bumps one allowlisted counter after a bot
//!   filter and a per-IP fixed-window rate limit, then drops the snapshot.
//!
//! Counters live in a [`store::CounterStore`]; in production that is the
//! Firebase Realtime Database, where increments are ETag-guarded conditional
//! writes so several instances can share one database.

pub mod allowlist;
pub mod bot;
pub mod cache;
pub mod client_ip;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod router;
pub mod state;
pub mod store;
