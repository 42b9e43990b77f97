use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

// Failures talking to the counter store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store responded with status {0}")]
    Status(u16),

    #[error("store returned malformed data: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("store protocol violation: {0}")]
    Protocol(&'static str),

    #[error("invalid store url: {0}")]
    InvalidUrl(String),

    #[error("counter at {path} is already at its maximum")]
    Overflow { path: String },

    #[error("increment gave up after {attempts} conflicting attempts")]
    Contention { attempts: u32 },

    #[error("store is unavailable")]
    Unavailable,
}

/// Errors surfaced by the HTTP handlers.
///
/// The client only ever sees the `error` message returned by
/// [`AppError::public_message`]; store detail stays in the logs.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("invalid metric target")]
    InvalidTarget,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("reading counters failed: {0}")]
    StoreRead(#[source] StoreError),

    #[error("incrementing counter failed: {0}")]
    StoreWrite(#[source] StoreError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidTarget => StatusCode::BAD_REQUEST,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::StoreRead(_) | AppError::StoreWrite(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn public_message(&self) -> &'static str {
        match self {
            AppError::InvalidTarget => "Invalid metric target",
            AppError::RateLimited => "Too many requests",
            AppError::StoreRead(_) => "System Busy",
            AppError::StoreWrite(_) => "Update failed",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}
