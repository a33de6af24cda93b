//! Shared error handling for API endpoints.
//!
//! The response shapes mirror the platform's existing clients: business-rule
//! and internal failures share one broad 400 `{success, message}` shape,
//! refresh failures are 403, a missing principal is 401, and a failed login
//! is a plain-text 404 (an asymmetry kept for compatibility). Stack traces
//! never reach the client; only the message text does.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::refresh::{RefreshError, TokenRefreshError};

/// Uniform `{success, message}` response body.
#[derive(Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Extension trait for concise error mapping on Results.
pub trait ResultExt<T> {
    fn db_err(self, msg: &str) -> Result<T, ApiError>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn db_err(self, msg: &str) -> Result<T, ApiError> {
        self.map_err(|e| ApiError::db_error(msg, e))
    }
}

/// API error type with automatic response conversion.
pub enum ApiError {
    /// Validation and generic runtime faults: 400 `{success:false, message}`.
    BadRequest(String),
    /// Missing principal: 401 `{success:false, message}`.
    Unauthorized(String),
    /// Refresh token absent or expired: 403 `{success:false, message}`.
    TokenRefresh(TokenRefreshError),
    /// Credential failure at login: 404 with a plain-text body. Unknown
    /// email and wrong password are deliberately indistinguishable.
    LoginFailed,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Self::Unauthorized(msg.into())
    }

    pub fn db_error(context: &str, e: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, e);
        Self::BadRequest("Database error".into())
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        match e {
            RefreshError::Refresh(e) => ApiError::TokenRefresh(e),
            RefreshError::Database(e) => ApiError::db_error("Refresh token store failed", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, Json(ApiResponse::err(msg))).into_response()
            }
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, Json(ApiResponse::err(msg))).into_response()
            }
            ApiError::TokenRefresh(e) => (
                StatusCode::FORBIDDEN,
                Json(ApiResponse::err(e.to_string())),
            )
                .into_response(),
            ApiError::LoginFailed => {
                (StatusCode::NOT_FOUND, "User not found.").into_response()
            }
        }
    }
}
