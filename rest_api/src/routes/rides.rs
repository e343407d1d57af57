// rest_api/src/routes/rides.rs

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use lib::{SearchParams, SearchPlan};
use models::{NetId, NewRide, Ride, RideUpdate};
use security::CurrentUser;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};

use super::parse_ride_id;
use crate::errors::{ApiResult, RestApiError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RideIdQuery {
    #[serde(default, rename = "rideId")]
    pub ride_id: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

// POST /api/rides/post
pub async fn post_ride_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    payload: Result<Json<NewRide>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(new_ride) = payload?;
    if (is_blank(&new_ride.beginning) && is_blank(&new_ride.departure))
        || is_blank(&new_ride.destination)
    {
        return Err(RestApiError::BadRequest(
            "Beginning and destination are required".to_string(),
        ));
    }

    let ride = Ride::from_new_ride(new_ride, &user)?;
    state.storage.create_ride(&ride).await?;
    info!("{} posted ride {} ({} -> {})", user.net_id, ride.ride_id, ride.beginning, ride.destination);

    Ok(Json(json!({ "message": "Ride created successfully", "ride": ride })))
}

/// Loads the ride named by `rideId` and checks that `net_id` owns it.
async fn owned_ride(
    state: &AppState,
    query: &RideIdQuery,
    net_id: &NetId,
    action: &str,
) -> ApiResult<Ride> {
    let ride_id = parse_ride_id(query.ride_id.as_deref(), "rideId is required")?;
    let ride = state
        .storage
        .get_ride(&ride_id)
        .await?
        .ok_or_else(|| RestApiError::NotFound("Ride not found".to_string()))?;
    if !ride.is_owned_by(net_id) {
        return Err(RestApiError::Forbidden(format!("Unauthorized to {} this ride", action)));
    }
    Ok(ride)
}

// PATCH /api/rides/update?rideId=
pub async fn update_ride_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RideIdQuery>,
    payload: Result<Json<RideUpdate>, JsonRejection>,
) -> ApiResult<Json<Ride>> {
    let existing = owned_ride(&state, &query, &user.net_id, "edit").await?;
    let Json(update) = payload?;

    let updated = state.storage.update_ride(&existing.ride_id, &update).await?;
    info!("{} edited ride {}", user.net_id, updated.ride_id);

    Ok(Json(updated))
}

// DELETE /api/rides/update?rideId=
pub async fn delete_ride_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<RideIdQuery>,
) -> ApiResult<Json<Value>> {
    let ride = owned_ride(&state, &query, &user.net_id, "delete").await?;
    state.storage.delete_ride(&ride.ride_id).await?;
    info!("{} deleted ride {}", user.net_id, ride.ride_id);

    Ok(Json(json!({ "message": "Ride deleted successfully" })))
}

/// Coarse storage filter followed by the time-of-day matcher.
pub(crate) async fn run_search(state: &AppState, params: &SearchParams) -> ApiResult<Vec<Ride>> {
    let plan = SearchPlan::build(params, state.tz)?;
    let candidates = state.storage.find_filtered_rides(&plan.filter).await?;
    let found = candidates.len();
    let rides = plan.apply(candidates);
    debug!("Search matched {} of {} candidate rides", rides.len(), found);
    Ok(rides)
}

// GET /api/rides/search
pub async fn search_rides_handler(
    State(state): State<AppState>,
    _user: CurrentUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<Vec<Ride>>> {
    let Query(params) = params?;
    Ok(Json(run_search(&state, &params).await?))
}
