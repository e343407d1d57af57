// rest_api/src/routes/pages.rs
//
// Data behind the signed-in pages. Each handler returns the JSON the page
// renders from.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use lib::{SearchError, SearchParams};
use models::{NetId, Ride};
use security::CurrentUser;
use serde::Serialize;
use uuid::Uuid;

use super::rides::run_search;
use crate::errors::{ApiResult, RestApiError};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideListPage {
    pub initial_rides: Vec<Ride>,
    pub bookmarked_ride_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarksPage {
    pub bookmarked_rides: Vec<Ride>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YourRidesPage {
    pub owned_rides: Vec<Ride>,
    pub bookmarked_ride_ids: Vec<Uuid>,
}

async fn bookmarked_ids(state: &AppState, net_id: &NetId) -> ApiResult<Vec<Uuid>> {
    Ok(state.storage.list_bookmarked_ride_ids(net_id).await?)
}

// GET /feed
pub async fn feed_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<RideListPage>> {
    let initial_rides = state.storage.list_open_rides(state.config.feed_limit).await?;
    Ok(Json(RideListPage {
        initial_rides,
        bookmarked_ride_ids: bookmarked_ids(&state, &user.net_id).await?,
    }))
}

// GET /bookmarks
pub async fn bookmarks_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<BookmarksPage>> {
    let bookmarked_rides = state.storage.list_bookmarked_rides(&user.net_id).await?;
    Ok(Json(BookmarksPage { bookmarked_rides }))
}

// GET /your-rides
pub async fn your_rides_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<YourRidesPage>> {
    let owned_rides = state.storage.list_rides_by_owner(&user.net_id).await?;
    Ok(Json(YourRidesPage {
        owned_rides,
        bookmarked_ride_ids: bookmarked_ids(&state, &user.net_id).await?,
    }))
}

// GET /results
pub async fn results_handler(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<RideListPage>> {
    let Query(params) = params?;
    // An empty search form lists the feed instead of failing.
    let initial_rides = match run_search(&state, &params).await {
        Err(RestApiError::Search(SearchError::NoFilters)) => {
            state.storage.list_open_rides(state.config.feed_limit).await?
        }
        other => other?,
    };
    Ok(Json(RideListPage {
        initial_rides,
        bookmarked_ride_ids: bookmarked_ids(&state, &user.net_id).await?,
    }))
}
