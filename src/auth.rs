//! Per-request identity resolution from a bearer token.
//!
//! The [`resolve_identity`] middleware runs once per API request: it parses
//! the `Authorization` header, validates the access token, resolves the
//! subject email to a user, and attaches an [`AuthPrincipal`] to the request
//! extensions. Every failure along the way degrades to "unauthenticated" and
//! the request continues; public endpoints stay reachable and a deleted user
//! never crashes request processing.
//!
//! Handlers that require a principal use the [`CurrentUser`] extractor,
//! whose rejection is the 401 unauthenticated error.

use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, StatusCode, header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::db::{Database, User};
use crate::jwt::JwtConfig;

/// A granted capability. No authorization logic is implemented, so this set
/// is always empty; role-based authorization is an extension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Authority {}

/// The resolved identity attached to a request after successful token
/// validation. Request-scoped: built by [`resolve_identity`], discarded when
/// the request finishes.
#[derive(Debug, Clone)]
pub struct AuthPrincipal {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

impl AuthPrincipal {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
        }
    }

    /// The principal's granted authorities. Always empty.
    pub fn authorities(&self) -> &[Authority] {
        &[]
    }
}

/// State required to resolve identities.
#[derive(Clone)]
pub struct IdentityState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
}

/// Extract the candidate token from the `Authorization` header.
///
/// A single deterministic parse: the value must be prefixed `"Bearer "` and
/// the remainder must be non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    if token.is_empty() { None } else { Some(token) }
}

/// Identity resolution middleware.
///
/// Never short-circuits: whatever happens in token extraction, validation,
/// or user lookup, the request proceeds to the next service, authenticated
/// or not.
pub async fn resolve_identity(
    State(state): State<IdentityState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(request.headers()) {
        if let Ok(claims) = state.jwt.validate_access_token(token) {
            match state.db.users().get_by_email(&claims.sub).await {
                Ok(Some(user)) => {
                    request.extensions_mut().insert(AuthPrincipal::from_user(&user));
                }
                Ok(None) => {
                    // User deleted after token issuance; proceed unauthenticated
                    tracing::warn!(email = %claims.sub, "Token subject no longer exists");
                }
                Err(e) => {
                    tracing::error!(error = %e, "Cannot set user authentication");
                }
            }
        }
    }

    next.run(request).await
}

/// Rejection for requests that require a principal and have none.
pub struct Unauthenticated;

impl IntoResponse for Unauthenticated {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "success": false, "message": "User not authenticated" })),
        )
            .into_response()
    }
}

/// Extractor for endpoints that require an authenticated principal.
pub struct CurrentUser(pub AuthPrincipal);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = Unauthenticated;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthPrincipal>()
            .cloned()
            .map(CurrentUser)
            .ok_or(Unauthenticated)
    }
}
