// rest_api/src/routes/bookmarks.rs

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use security::CurrentUser;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use super::parse_ride_id;
use crate::errors::{ApiResult, RestApiError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkRequest {
    #[serde(default)]
    pub ride_id: Option<String>,
}

// POST /api/bookmark
pub async fn toggle_bookmark_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<BookmarkRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(request) = payload?;
    let ride_id = parse_ride_id(
        request.ride_id.as_deref(),
        "Request payload does not contain rideId",
    )?;

    if state.storage.get_ride(&ride_id).await?.is_none() {
        return Err(RestApiError::NotFound("Ride not found".to_string()));
    }
    let bookmarked = state.storage.toggle_bookmark(&user.net_id, &ride_id).await?;
    info!(
        "{} {} ride {}",
        user.net_id,
        if bookmarked { "bookmarked" } else { "unbookmarked" },
        ride_id
    );

    Ok(Json(json!({ "bookmarked": bookmarked })))
}
