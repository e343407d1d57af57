// rest_api/src/routes/auth.rs

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use models::User;
use security::redirect::{cas_service_url, resolve_safe_redirect};
use security::{CurrentUser, removal_cookie};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::test_user;
use crate::errors::{ApiResult, RestApiError};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    #[serde(default)]
    pub redirect: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateQuery {
    #[serde(default)]
    pub ticket: Option<String>,
    #[serde(default)]
    pub redirect: Option<String>,
}

// GET /api/auth/cas-login
pub async fn cas_login_handler(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Redirect {
    let service = cas_service_url(state.base_url(), query.redirect.as_deref());
    Redirect::temporary(&state.cas.login_url(&service))
}

// GET /api/auth/cas-validate
pub async fn cas_validate_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ValidateQuery>,
) -> ApiResult<(CookieJar, Redirect)> {
    let ticket = query
        .ticket
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| RestApiError::BadRequest("CAS Validate: No CAS ticket provided".to_string()))?;
    let redirect = query.redirect.as_deref();

    // Must match the service URL sent at login, redirect included.
    let service = cas_service_url(state.base_url(), redirect);
    let net_id = state.cas.validate(ticket, &service).await?.ok_or_else(|| {
        RestApiError::BadRequest("CAS Validate: Ticket validation failed".to_string())
    })?;

    let person = state.directory.find_person(&net_id).await?.ok_or_else(|| {
        warn!("Directory has no record for {}", net_id);
        RestApiError::NotFound(format!(
            "CAS Validate: Yalies returned no data for netId {}",
            net_id
        ))
    })?;

    let user = User::new(net_id.clone(), &person.first_name, &person.last_name, &person.email);
    state.storage.find_or_create_user(user).await?;

    let token = state.tokens.issue(&net_id, &person)?;
    let jar = jar.add(state.tokens.session_cookie(token, state.config.is_secure()));
    info!("User {} logged in", net_id);

    Ok((jar, Redirect::temporary(&resolve_safe_redirect(redirect, state.base_url()))))
}

// GET /api/auth/logout
pub async fn logout_handler(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    let jar = jar.remove(removal_cookie());
    let base = state.base_url();
    let target = if state.config.environment.is_production() {
        state.cas.logout_url(base)
    } else {
        base.to_string()
    };
    (jar, Redirect::temporary(&target))
}

// GET /api/auth/test-login
pub async fn test_login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> ApiResult<(CookieJar, Redirect)> {
    if state.config.environment.is_production() {
        return Err(RestApiError::Forbidden("Not allowed".to_string()));
    }
    let (net_id, user) = test_user()?;
    state.storage.find_or_create_user(user).await?;

    let token = state.tokens.issue(&net_id, &super::test_person())?;
    let jar = jar.add(state.tokens.session_cookie(token, state.config.is_secure()));
    info!("Test login issued for {}", net_id);

    Ok((jar, Redirect::temporary(&format!("{}/feed", state.base_url()))))
}

// GET /api/me
pub async fn me_handler(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({
        "netId": user.net_id,
        "name": user.name,
        "email": user.email,
    }))
}
