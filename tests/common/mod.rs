#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
};
use paperboard::{ServerConfig, create_app, db::Database};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &[u8] = b"test-jwt-secret-that-is-long-enough!";

/// Create a test app backed by an in-memory database.
pub async fn create_test_app() -> (axum::Router, Database) {
    let db = Database::open(":memory:")
        .await
        .expect("Failed to open test database");
    let config = ServerConfig {
        db: db.clone(),
        jwt_secret: TEST_JWT_SECRET.to_vec(),
    };
    (create_app(&config), db)
}

/// Build a POST request with a JSON body.
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// Build a POST request with a JSON body and a bearer token.
pub fn post_json_auth(uri: &str, body: &Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .expect("Failed to build request")
}

/// Build a bodyless request with a bearer token.
pub fn request_auth(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .expect("Failed to build request")
}

/// Read a response body as a string.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    String::from_utf8(bytes.to_vec()).expect("Response body is not UTF-8")
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let text = body_text(response).await;
    serde_json::from_str(&text).expect("Response body is not JSON")
}

/// Register a user through the API.
pub async fn signup(app: &axum::Router, username: &str, email: &str, password: &str) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/signup",
            &json!({"username": username, "email": email, "password": password}),
        ))
        .await
        .expect("Signup request failed");
    assert_eq!(response.status(), StatusCode::OK);
}

/// Log in through the API and return (access_token, refresh_token).
pub async fn login(app: &axum::Router, email: &str, password: &str) -> (String, String) {
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            &json!({"email": email, "password": password}),
        ))
        .await
        .expect("Login request failed");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    (
        body["accessToken"].as_str().expect("Missing accessToken").to_string(),
        body["refreshToken"].as_str().expect("Missing refreshToken").to_string(),
    )
}

/// Sign up and log in a user, returning (access_token, refresh_token).
pub async fn signup_and_login(
    app: &axum::Router,
    username: &str,
    email: &str,
    password: &str,
) -> (String, String) {
    signup(app, username, email, password).await;
    login(app, email, password).await
}
