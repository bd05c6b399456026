//! Custom error types for the todo API
//!
//! Every failure a handler can produce is caught here and translated into
//! an HTTP status plus a JSON error body; nothing crosses the request
//! boundary unhandled.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::validation::FieldError;

/// Custom error type for the API
#[derive(Error, Debug)]
pub enum ApiError {
    /// Requested identity absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Required field missing or malformed
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Bad credentials. Deliberately uniform: the response never discloses
    /// whether the username existed or the password was wrong.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing or invalid bearer token
    #[error("Unauthorized")]
    Unauthorized,

    /// Caller address not on the allow-list
    #[error("Forbidden")]
    Forbidden,

    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Persistence collaborator failure
    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "message": msg })),
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Validation failed.", "errors": errors }),
            ),
            ApiError::InvalidCredentials => (
                StatusCode::BAD_REQUEST,
                json!({ "message": "Username or password is incorrect." }),
            ),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                json!({ "message": "Unauthorized." }),
            ),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, json!({ "message": "Forbidden." })),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "message": msg })),
            ApiError::Store(e) => {
                error!("Store error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    json!({ "message": "A data store error occurred." }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
