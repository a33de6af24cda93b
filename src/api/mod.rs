mod auth;
mod error;
mod feedback;
mod papers;

use axum::Router;
use std::sync::Arc;

use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::refresh::RefreshTokens;

/// Create the API router.
pub fn create_api_router(db: Database, jwt: Arc<JwtConfig>) -> Router {
    let auth_state = auth::AuthState {
        db: db.clone(),
        jwt: jwt.clone(),
        refresh: RefreshTokens::new(db.clone()),
    };

    let papers_state = papers::PapersState { db: db.clone() };

    let feedback_state = feedback::FeedbackState { db };

    Router::new()
        .nest("/auth", auth::router(auth_state))
        .nest("/papers", papers::router(papers_state))
        .nest("/feedback", feedback::router(feedback_state))
}
