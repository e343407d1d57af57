// rest_api/src/routes/admin.rs

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::test_user;
use crate::errors::{ApiResult, RestApiError};
use crate::state::AppState;

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

/// Compares without short-circuiting on the first differing byte.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn secret_matches(headers: &HeaderMap, secret: &str) -> bool {
    bearer_token(headers).is_some_and(|token| constant_time_eq(token.as_bytes(), secret.as_bytes()))
}

// GET /api/cleanup-rides
// Called by the scheduler; authenticated by the shared cron secret, not a session.
pub async fn cleanup_rides_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<Value>> {
    let Some(secret) = state.config.auth.cron_secret.as_deref().filter(|s| !s.is_empty()) else {
        warn!("Cleanup requested but no cron secret is configured");
        return Err(RestApiError::Unauthorized);
    };
    if !secret_matches(&headers, secret) {
        warn!("Cleanup requested with a bad cron secret");
        return Err(RestApiError::Unauthorized);
    }

    let closed = state.storage.close_expired_rides(Utc::now()).await?;
    info!("Closed {} expired rides", closed);

    Ok(Json(json!({ "success": true, "ridesClosed": closed })))
}

// POST /api/test-utils/reset-db
pub async fn reset_db_handler(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    if state.config.environment.is_production() {
        return Err(RestApiError::Forbidden("Not allowed".to_string()));
    }
    state.storage.reset().await?;
    let (_, user) = test_user()?;
    state.storage.create_user(&user).await?;
    warn!("Storage reset; recreated {}", user.net_id);

    Ok(Json(json!({ "ok": true })))
}
