use axum::{Json, response::IntoResponse};

// GET /
pub async fn root_handler() -> &'static str {
    "Portfolio Backend is Running"
}

// GET /health
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

// GET /api/ping - lets the front-end wake a sleeping instance early
pub async fn ping_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "online",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
