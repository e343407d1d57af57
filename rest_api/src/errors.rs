// rest_api/src/errors.rs

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lib::{SearchError, StorageError};
use models::errors::ValidationError;
use security::AuthError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Search(#[from] SearchError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Invalid request body: {0}")]
    Json(#[from] JsonRejection),
    #[error("Invalid query: {0}")]
    Query(#[from] QueryRejection),
}

impl RestApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            RestApiError::BadRequest(_)
            | RestApiError::Search(_)
            | RestApiError::Validation(_)
            | RestApiError::Json(_)
            | RestApiError::Query(_) => StatusCode::BAD_REQUEST,
            RestApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            RestApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            RestApiError::NotFound(_) => StatusCode::NOT_FOUND,
            RestApiError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            RestApiError::Storage(StorageError::AlreadyExists(_)) => StatusCode::CONFLICT,
            RestApiError::Storage(StorageError::Validation(_)) => StatusCode::BAD_REQUEST,
            RestApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RestApiError::Auth(AuthError::CasRequest(_) | AuthError::Directory(_)) => {
                StatusCode::BAD_GATEWAY
            }
            RestApiError::Auth(AuthError::InvalidToken(_) | AuthError::InvalidIdentity(_)) => {
                StatusCode::UNAUTHORIZED
            }
            RestApiError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RestApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            match status {
                StatusCode::BAD_GATEWAY => "Upstream service unavailable".to_string(),
                _ => "Internal server error".to_string(),
            }
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, RestApiError>;
