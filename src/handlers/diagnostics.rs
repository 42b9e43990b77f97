use axum::{Json, extract::State};
use serde_json::{Value, json};
use std::sync::Arc;

use crate::state::AppState;

// GET /api/test - round-trips a document through the store.
// Always 200; the store outcome is reported in the body.
pub async fn diagnostics_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    tracing::info!("store connectivity check requested");

    let (database_status, database_data) = match state.store.probe().await {
        Ok(doc) => ("connected", doc),
        Err(e) => {
            tracing::error!(operation = "probe", error = %e, "store connectivity check failed");
            ("error", Value::String("Database unreachable".to_string()))
        }
    };

    Json(json!({
        "status": "success",
        "message": "Backend, frontend, and database are connected!",
        "backend_time": chrono::Utc::now().to_rfc3339(),
        "database_status": database_status,
        "database_data": database_data,
    }))
}
