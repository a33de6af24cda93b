//! Paper CRUD endpoints.
//!
//! - POST `/` - Create a paper owned by the caller
//! - GET `/` - List the caller's papers
//! - DELETE `/{id}` - Delete one of the caller's papers

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, post},
};
use serde::{Deserialize, Serialize};

use super::error::{ApiError, ApiResponse, ResultExt};
use crate::auth::CurrentUser;
use crate::db::{Database, NewPaper, Paper};

#[derive(Clone)]
pub struct PapersState {
    pub db: Database,
}

pub fn router(state: PapersState) -> Router {
    Router::new()
        .route("/", post(create_paper).get(list_papers))
        .route("/{id}", delete(delete_paper))
        .with_state(state)
}

#[derive(Deserialize)]
struct CreatePaperRequest {
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PaperResponse {
    id: i64,
    user_id: i64,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
}

impl From<Paper> for PaperResponse {
    fn from(paper: Paper) -> Self {
        Self {
            id: paper.id,
            user_id: paper.user_id,
            title: paper.title,
            description: paper.description,
            content: paper.content,
        }
    }
}

/// Create a paper owned by the authenticated user.
async fn create_paper(
    State(state): State<PapersState>,
    CurrentUser(principal): CurrentUser,
    Json(request): Json<CreatePaperRequest>,
) -> Result<Json<PaperResponse>, ApiError> {
    let papers = state.db.papers();

    let id = papers
        .create(
            principal.user_id,
            &NewPaper {
                title: request.title,
                description: request.description,
                content: request.content,
            },
        )
        .await
        .db_err("Failed to create paper")?;

    let paper = papers
        .get_by_id(id)
        .await
        .db_err("Failed to load paper")?
        .ok_or_else(|| ApiError::bad_request("Paper not found"))?;

    Ok(Json(paper.into()))
}

/// List the authenticated user's papers.
async fn list_papers(
    State(state): State<PapersState>,
    CurrentUser(principal): CurrentUser,
) -> Result<Json<Vec<PaperResponse>>, ApiError> {
    let papers = state
        .db
        .papers()
        .list_by_user(principal.user_id)
        .await
        .db_err("Failed to list papers")?;

    Ok(Json(papers.into_iter().map(PaperResponse::from).collect()))
}

/// Delete a paper. Only the owner may delete it.
async fn delete_paper(
    State(state): State<PapersState>,
    CurrentUser(principal): CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse>, ApiError> {
    let papers = state.db.papers();

    let paper = papers
        .get_by_id(id)
        .await
        .db_err("Failed to load paper")?
        .ok_or_else(|| ApiError::bad_request("Paper not found"))?;

    if paper.user_id != principal.user_id {
        return Err(ApiError::bad_request(
            "You are not authorized to delete this paper",
        ));
    }

    papers.delete(id).await.db_err("Failed to delete paper")?;

    Ok(Json(ApiResponse::ok("Paper deleted successfully")))
}
