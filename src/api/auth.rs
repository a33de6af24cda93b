//! Authentication endpoints.
//!
//! - POST `/signup` - Register a new user
//! - POST `/login` - Verify credentials, issue access + refresh tokens
//! - POST `/refresh-token` - Exchange a refresh token for a new access token
//! - POST `/logout` - Invalidate the caller's refresh tokens
//!
//! Both tokens are delivered in the JSON body. Login replaces any prior
//! refresh token for the user; renewal keeps the same refresh token string.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use super::error::{ApiError, ApiResponse, ResultExt};
use crate::auth::CurrentUser;
use crate::db::{Database, NewUser};
use crate::jwt::JwtConfig;
use crate::password::{hash_password, verify_password};
use crate::refresh::{RefreshTokens, TokenRefreshError};

#[derive(Clone)]
pub struct AuthState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub refresh: RefreshTokens,
}

pub fn router(state: AuthState) -> Router {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/refresh-token", post(refresh_token))
        .route("/logout", post(logout))
        .with_state(state)
}

#[derive(Deserialize)]
struct SignupRequest {
    username: String,
    email: String,
    password: String,
    #[serde(default)]
    role: String,
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JwtResponse {
    access_token: String,
    refresh_token: String,
    token_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRefreshRequest {
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRefreshResponse {
    access_token: String,
    refresh_token: String,
}

/// Register a new user. Duplicate email or username is rejected before any
/// write happens.
async fn signup(
    State(state): State<AuthState>,
    Json(request): Json<SignupRequest>,
) -> Result<String, ApiError> {
    let users = state.db.users();

    if users
        .exists_by_email(&request.email)
        .await
        .db_err("Failed to check email")?
    {
        return Err(ApiError::bad_request("Email already in use"));
    }
    if users
        .exists_by_username(&request.username)
        .await
        .db_err("Failed to check username")?
    {
        return Err(ApiError::bad_request("Username already in use"));
    }

    let password_hash = hash_password(&request.password).map_err(|e| {
        error!(error = %e, "Failed to hash password");
        ApiError::bad_request("Failed to register user")
    })?;

    users
        .create(&NewUser {
            username: request.username.clone(),
            email: request.email,
            password_hash,
            role: request.role,
        })
        .await
        .db_err("Failed to create user")?;

    info!(username = %request.username, "User registered");
    Ok("User registered successfully!".to_string())
}

/// Verify credentials and issue one access token plus one refresh token.
///
/// Every failure maps to the same 404 plain-text response so the caller
/// cannot tell an unknown email from a wrong password.
async fn login(
    State(state): State<AuthState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<JwtResponse>, ApiError> {
    let user = state
        .db
        .users()
        .get_by_email(&request.email)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to look up user");
            ApiError::LoginFailed
        })?
        .ok_or(ApiError::LoginFailed)?;

    let verified = verify_password(&request.password, &user.password_hash).unwrap_or(false);
    if !verified {
        return Err(ApiError::LoginFailed);
    }

    let access = state.jwt.generate_access_token(&user.email).map_err(|e| {
        error!(error = %e, "Failed to generate access token");
        ApiError::LoginFailed
    })?;

    // Supersedes any refresh token from a previous login
    let refresh = state
        .refresh
        .create_refresh_token(user.id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create refresh token");
            ApiError::LoginFailed
        })?;

    Ok(Json(JwtResponse {
        access_token: access.token,
        refresh_token: refresh.token,
        token_type: "Bearer",
    }))
}

/// Exchange a refresh token for a new access token.
///
/// The refresh token itself is not rotated: the response pairs the new
/// access token with the same refresh token string that was presented.
async fn refresh_token(
    State(state): State<AuthState>,
    Json(request): Json<TokenRefreshRequest>,
) -> Result<Json<TokenRefreshResponse>, ApiError> {
    let record = state
        .refresh
        .find_by_token(&request.refresh_token)
        .await?
        .ok_or_else(|| {
            ApiError::TokenRefresh(TokenRefreshError::new(
                request.refresh_token.clone(),
                "Refresh token is not in database!",
            ))
        })?;

    let record = state.refresh.verify_expiration(record).await?;

    let user = state
        .db
        .users()
        .get_by_id(record.user_id)
        .await
        .db_err("Failed to load token owner")?
        .ok_or_else(|| {
            ApiError::TokenRefresh(TokenRefreshError::new(
                record.token.clone(),
                "Refresh token is not in database!",
            ))
        })?;

    let access = state.jwt.generate_access_token(&user.email).map_err(|e| {
        error!(error = %e, "Failed to generate access token");
        ApiError::bad_request("Failed to generate token")
    })?;

    Ok(Json(TokenRefreshResponse {
        access_token: access.token,
        refresh_token: record.token,
    }))
}

/// Invalidate all refresh tokens for the authenticated user.
///
/// Idempotent: a second logout deletes zero rows and still succeeds. A
/// request without a principal is rejected with 401 by the extractor.
async fn logout(
    State(state): State<AuthState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<ApiResponse>, ApiError> {
    let deleted = state
        .refresh
        .delete_by_user(principal.user_id)
        .await
        .db_err("Failed to delete refresh tokens")?;

    info!(user_id = principal.user_id, deleted, "User logged out");
    Ok(Json(ApiResponse::ok("Logged out successfully")))
}
