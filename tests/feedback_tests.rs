//! Tests for the feedback endpoints.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_app, post_json, post_json_auth, signup_and_login};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn create_paper(app: &axum::Router, access: &str, title: &str) -> i64 {
    let response = app
        .clone()
        .oneshot(post_json_auth(
            "/api/papers",
            &json!({"title": title}),
            access,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["id"].as_i64().unwrap()
}

async fn submit(app: &axum::Router, access: &str, body: &Value) -> axum::http::Response<axum::body::Body> {
    app.clone()
        .oneshot(post_json_auth("/api/feedback/submit", body, access))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_submit_feedback() {
    let (app, _db) = create_test_app().await;
    let (access, _) = signup_and_login(&app, "alice", "alice@example.com", "secret123").await;
    let paper_id = create_paper(&app, &access, "Reviewed paper").await;

    let response = submit(
        &app,
        &access,
        &json!({
            "paperId": paper_id,
            "feedbackType": "review",
            "role": "reviewer",
            "rating": 4,
            "feedbackText": "Solid methodology"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["paperId"], paper_id);
    assert_eq!(body["rating"], 4);
    assert_eq!(body["feedbackText"], "Solid methodology");
    assert!(!body["createdAt"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_resubmit_updates_in_place() {
    let (app, _db) = create_test_app().await;
    let (access, _) = signup_and_login(&app, "alice", "alice@example.com", "secret123").await;
    let paper_id = create_paper(&app, &access, "Reviewed paper").await;

    let response = submit(
        &app,
        &access,
        &json!({"paperId": paper_id, "rating": 2, "feedbackText": "First pass"}),
    )
    .await;
    let first = body_json(response).await;

    let response = submit(
        &app,
        &access,
        &json!({"paperId": paper_id, "rating": 5, "feedbackText": "Much improved"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let second = body_json(response).await;

    // Same row, new values
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["rating"], 5);
    assert_eq!(second["feedbackText"], "Much improved");
}

#[tokio::test]
async fn test_different_users_get_separate_feedback_rows() {
    let (app, _db) = create_test_app().await;
    let (alice, _) = signup_and_login(&app, "alice", "alice@example.com", "secret123").await;
    let (bob, _) = signup_and_login(&app, "bob", "bob@example.com", "secret456").await;
    let paper_id = create_paper(&app, &alice, "Shared paper").await;

    let response = submit(&app, &alice, &json!({"paperId": paper_id, "rating": 3})).await;
    let alice_row = body_json(response).await;

    let response = submit(&app, &bob, &json!({"paperId": paper_id, "rating": 5})).await;
    let bob_row = body_json(response).await;

    assert_ne!(alice_row["id"], bob_row["id"]);
}

#[tokio::test]
async fn test_feedback_for_missing_paper_is_400() {
    let (app, _db) = create_test_app().await;
    let (access, _) = signup_and_login(&app, "alice", "alice@example.com", "secret123").await;

    let response = submit(&app, &access, &json!({"paperId": 999, "rating": 3})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Paper not found: 999");
}

#[tokio::test]
async fn test_rating_bounds_are_enforced() {
    let (app, _db) = create_test_app().await;
    let (access, _) = signup_and_login(&app, "alice", "alice@example.com", "secret123").await;
    let paper_id = create_paper(&app, &access, "Rated paper").await;

    for rating in [json!(0), json!(6), Value::Null] {
        let response = submit(&app, &access, &json!({"paperId": paper_id, "rating": rating})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Rating must be between 1 and 5");
    }
}

#[tokio::test]
async fn test_overlong_feedback_text_is_rejected() {
    let (app, _db) = create_test_app().await;
    let (access, _) = signup_and_login(&app, "alice", "alice@example.com", "secret123").await;
    let paper_id = create_paper(&app, &access, "Rated paper").await;

    let response = submit(
        &app,
        &access,
        &json!({"paperId": paper_id, "rating": 3, "feedbackText": "x".repeat(2001)}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Feedback exceeds 2000 characters");
}

#[tokio::test]
async fn test_feedback_requires_authentication() {
    let (app, _db) = create_test_app().await;

    let response = app
        .oneshot(post_json(
            "/api/feedback/submit",
            &json!({"paperId": 1, "rating": 3}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
