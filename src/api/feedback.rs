//! Feedback endpoints.
//!
//! - POST `/submit` - Submit or update feedback on a paper
//!
//! Feedback is an upsert per (paper, user): a second submission from the
//! same user for the same paper updates the existing row in place.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ResultExt};
use crate::auth::CurrentUser;
use crate::db::{Database, Feedback};

const MAX_FEEDBACK_TEXT_LEN: usize = 2000;

#[derive(Clone)]
pub struct FeedbackState {
    pub db: Database,
}

pub fn router(state: FeedbackState) -> Router {
    Router::new()
        .route("/submit", post(submit_feedback))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackRequest {
    paper_id: i64,
    feedback_type: Option<String>,
    role: Option<String>,
    rating: Option<i64>,
    feedback_text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedbackResponse {
    id: i64,
    paper_id: i64,
    user_id: i64,
    feedback_type: Option<String>,
    role: Option<String>,
    rating: Option<i64>,
    feedback_text: Option<String>,
    created_at: String,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            paper_id: f.paper_id,
            user_id: f.user_id,
            feedback_type: f.feedback_type,
            role: f.role,
            rating: f.rating,
            feedback_text: f.feedback_text,
            created_at: f.created_at,
        }
    }
}

/// Submit feedback on a paper, or update the caller's previous feedback.
async fn submit_feedback(
    State(state): State<FeedbackState>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<FeedbackRequest>,
) -> Result<(StatusCode, Json<FeedbackResponse>), ApiError> {
    let paper = state
        .db
        .papers()
        .get_by_id(request.paper_id)
        .await
        .db_err("Failed to load paper")?
        .ok_or_else(|| {
            ApiError::bad_request(format!("Paper not found: {}", request.paper_id))
        })?;

    let rating = match request.rating {
        Some(r) if (1..=5).contains(&r) => r,
        _ => return Err(ApiError::bad_request("Rating must be between 1 and 5")),
    };
    if let Some(text) = &request.feedback_text {
        if text.len() > MAX_FEEDBACK_TEXT_LEN {
            return Err(ApiError::bad_request("Feedback exceeds 2000 characters"));
        }
    }

    let store = state.db.feedback();

    let existing = store
        .get_by_paper_and_user(paper.id, principal.user_id)
        .await
        .db_err("Failed to check existing feedback")?;

    let id = match existing {
        Some(existing) => {
            store
                .update(
                    existing.id,
                    request.feedback_type.as_deref(),
                    request.role.as_deref(),
                    rating,
                    request.feedback_text.as_deref(),
                )
                .await
                .db_err("Failed to update feedback")?;
            existing.id
        }
        None => store
            .create(
                paper.id,
                principal.user_id,
                request.feedback_type.as_deref(),
                request.role.as_deref(),
                rating,
                request.feedback_text.as_deref(),
            )
            .await
            .db_err("Failed to create feedback")?,
    };

    let saved = store
        .get_by_id(id)
        .await
        .db_err("Failed to load feedback")?
        .ok_or_else(|| ApiError::bad_request("Feedback not found"))?;

    Ok((StatusCode::CREATED, Json(saved.into())))
}
