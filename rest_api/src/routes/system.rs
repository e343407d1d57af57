// rest_api/src/routes/system.rs

use axum::Json;
use axum::http::StatusCode;
use serde_json::{Value, json};

// Handler for the /api/health endpoint
pub async fn health_check_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok", "message": "Yideshare API is healthy" })))
}

// Handler for the /api/version endpoint
pub async fn version_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "version": env!("CARGO_PKG_VERSION"), "api_level": 1 })))
}
