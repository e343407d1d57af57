// rest_api/src/lib.rs

pub mod errors;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::Method;
use axum::routing::{get, post};
use axum::{Router, middleware};
use security::require_auth;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use errors::{ApiResult, RestApiError};
pub use state::AppState;

use routes::{admin, auth, bookmarks, pages, rides, system};

/// Builds the full application router. Session checks run before every
/// handler; `require_auth` decides which paths are gated.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(system::health_check_handler))
        .route("/api/version", get(system::version_handler))
        .route("/api/auth/cas-login", get(auth::cas_login_handler))
        .route("/api/auth/cas-validate", get(auth::cas_validate_handler))
        .route("/api/auth/logout", get(auth::logout_handler))
        .route("/api/auth/test-login", get(auth::test_login_handler))
        .route("/api/me", get(auth::me_handler))
        .route("/api/rides/post", post(rides::post_ride_handler))
        .route(
            "/api/rides/update",
            axum::routing::patch(rides::update_ride_handler).delete(rides::delete_ride_handler),
        )
        .route("/api/rides/search", get(rides::search_rides_handler))
        .route("/api/bookmark", post(bookmarks::toggle_bookmark_handler))
        .route("/api/cleanup-rides", get(admin::cleanup_rides_handler))
        .route("/api/test-utils/reset-db", post(admin::reset_db_handler))
        .route("/feed", get(pages::feed_handler))
        .route("/bookmarks", get(pages::bookmarks_handler))
        .route("/your-rides", get(pages::your_rides_handler))
        .route("/results", get(pages::results_handler))
        .layer(middleware::from_fn_with_state(state.tokens.clone(), require_auth))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves the API on `addr` until `shutdown_rx` fires, then flushes storage.
pub async fn start_server(
    state: AppState,
    addr: SocketAddr,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<()> {
    let storage = state.storage.clone();
    let app = build_router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Yideshare API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            // A dropped sender also stops the server.
            let _ = shutdown_rx.await;
            info!("Shutdown signal received, draining connections");
        })
        .await
        .context("HTTP server error")?;

    storage.flush().await.context("Failed to flush storage on shutdown")?;
    info!("Yideshare API stopped");
    Ok(())
}
