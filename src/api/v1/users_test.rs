//! Integration tests for user endpoints.

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;

use super::test_support::{create_user, json_body, send, test_app};

#[tokio::test(flavor = "multi_thread")]
async fn create_user_returns_envelope() {
    let app = test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "email": "dana@example.com", "name": "Dana" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["email"], "dana@example.com");
    assert_eq!(body["data"]["name"], "Dana");
    assert_eq!(body["data"]["id"].as_str().unwrap().len(), 32);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_a_conflict() {
    let app = test_app().await;
    create_user(&app, "dana@example.com").await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "email": "dana@example.com" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "user_already_exists");
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_email_is_rejected() {
    let app = test_app().await;

    let response = send(
        &app,
        "POST",
        "/api/v1/users",
        None,
        Some(json!({ "email": "not-an-email" })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}

#[tokio::test(flavor = "multi_thread")]
async fn get_user_by_id_and_email() {
    let app = test_app().await;
    let id = create_user(&app, "dana@example.com").await;

    let response = send(&app, "GET", &format!("/api/v1/users/{}", id), None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["email"], "dana@example.com");

    let response = send(
        &app,
        "GET",
        "/api/v1/users/by-email/dana@example.com",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["id"], id.as_str());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_user_lookups_are_distinct_404s() {
    let app = test_app().await;

    let response = send(&app, "GET", "/api/v1/users/nope", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "user_not_found_by_id");

    let response = send(
        &app,
        "GET",
        "/api/v1/users/by-email/ghost@example.com",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["error"], "user_not_found_by_email");
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_user_is_idempotent() {
    let app = test_app().await;
    let payload = json!({ "email": "auth@example.com", "name": "From OAuth" });

    let first = json_body(
        send(
            &app,
            "PUT",
            "/api/v1/users/oauth-123",
            None,
            Some(payload.clone()),
        )
        .await,
    )
    .await;
    let second = json_body(send(&app, "PUT", "/api/v1/users/oauth-123", None, Some(payload)).await).await;

    assert_eq!(first["data"]["id"], "oauth-123");
    assert_eq!(second["data"]["id"], "oauth-123");
    assert_eq!(first["data"]["created_at"], second["data"]["created_at"]);
    assert!(
        second["data"]["updated_at"].as_str().unwrap()
            >= first["data"]["updated_at"].as_str().unwrap()
    );

    let list = json_body(send(&app, "GET", "/api/v1/users", None, None).await).await;
    assert_eq!(list["pagination"]["total"], 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_users_paginates() {
    let app = test_app().await;
    for i in 0..3 {
        create_user(&app, &format!("user{}@example.com", i)).await;
    }

    let response = send(
        &app,
        "GET",
        "/api/v1/users?page=2&limit=2&sort=email",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["email"], "user2@example.com");
    assert_eq!(
        body["pagination"],
        json!({ "total": 3, "page": 2, "limit": 2, "pages": 2 })
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_query_is_an_enveloped_bad_request() {
    let app = test_app().await;

    let response = send(&app, "GET", "/api/v1/users?page=abc", None, None).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "validation");
}

#[tokio::test(flavor = "multi_thread")]
async fn non_json_body_is_an_enveloped_bad_request() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/users")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "validation");
}
