//! Shared helpers for the v1 endpoint tests.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    response::Response,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::api::{AppState, USER_ID_HEADER, routes};
use crate::db::{Database, SqliteDatabase};

/// Create a test app with an in-memory database
pub async fn test_app() -> Router {
    let db = SqliteDatabase::in_memory().await.unwrap();
    db.migrate().await.unwrap();
    routes::create_router(AppState::new(db))
}

/// Helper to parse JSON response body
pub async fn json_body(response: Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Send a request, optionally as `user` and with a JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(USER_ID_HEADER, user);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    app.clone().oneshot(request).await.unwrap()
}

/// Register a user through the API and return its id.
pub async fn create_user(app: &Router, email: &str) -> String {
    let response = send(
        app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "email": email })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    body["data"]["id"].as_str().unwrap().to_string()
}
