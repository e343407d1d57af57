// security/src/middleware.rs

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use log::debug;
use models::AuthenticatedUser;
use serde_json::json;

use crate::redirect::login_redirect_path;
use crate::{AUTH_COOKIE, TokenIssuer};

/// Pages that need a session.
const GATED_PAGES: [&str; 4] = ["/feed", "/bookmarks", "/your-rides", "/results"];

/// API paths reachable without a session cookie.
const PUBLIC_API_PREFIXES: [&str; 5] = [
    "/api/auth",
    "/api/test-utils",
    "/api/cleanup-rides",
    "/api/health",
    "/api/version",
];

/// How a request path is treated by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Public,
    Api,
    Page,
}

fn under(path: &str, prefix: &str) -> bool {
    path == prefix
        || path
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('/'))
}

pub fn classify(path: &str) -> Gate {
    if under(path, "/api") {
        if PUBLIC_API_PREFIXES.iter().any(|prefix| under(path, prefix)) {
            Gate::Public
        } else {
            Gate::Api
        }
    } else if GATED_PAGES.iter().any(|page| under(path, page)) {
        Gate::Page
    } else {
        Gate::Public
    }
}

/// Rejection used when no authenticated user is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" }))).into_response()
    }
}

/// Checks the session cookie on gated paths.
///
/// API requests without a valid session get a 401; page requests are sent
/// to CAS login and returned to the page afterwards. On success the
/// `AuthenticatedUser` is stored in the request extensions.
pub async fn require_auth(
    State(tokens): State<TokenIssuer>,
    mut request: Request,
    next: Next,
) -> Response {
    let gate = classify(request.uri().path());
    if gate == Gate::Public {
        return next.run(request).await;
    }

    let jar = CookieJar::from_headers(request.headers());
    let user = jar
        .get(AUTH_COOKIE)
        .map(|cookie| tokens.authenticate(cookie.value()));

    match user {
        Some(Ok(user)) => {
            request.extensions_mut().insert(user);
            next.run(request).await
        }
        failure => {
            if let Some(Err(e)) = failure {
                debug!("Rejecting session for {}: {}", request.uri().path(), e);
            }
            match gate {
                Gate::Page => {
                    let intended = request
                        .uri()
                        .path_and_query()
                        .map(|pq| pq.as_str())
                        .unwrap_or("/feed");
                    Redirect::temporary(&login_redirect_path(intended)).into_response()
                }
                _ => Unauthorized.into_response(),
            }
        }
    }
}

/// The user whose session passed `require_auth`.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser(pub AuthenticatedUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .map(CurrentUser)
            .ok_or(Unauthorized)
    }
}
