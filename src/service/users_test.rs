//! Tests for UserService.

use std::sync::Arc;

use crate::db::{Database, NewUser, SqliteDatabase, UpsertUser};
use crate::service::{ServiceError, UserService};

async fn service() -> UserService<SqliteDatabase> {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    UserService::new(Arc::new(db))
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn register_lookup_and_duplicate_scenario() {
    let users = service().await;

    let created = users.register(&new_user("a@x.com")).await.unwrap();

    let by_id = users.get(&created.id).await.unwrap();
    assert_eq!(by_id.email, "a@x.com");

    let by_email = users.get_by_email("a@x.com").await.unwrap();
    assert_eq!(by_email, by_id);

    let err = users.register(&new_user("a@x.com")).await.unwrap_err();
    match err {
        ServiceError::UserAlreadyExists { email } => assert_eq!(email, "a@x.com"),
        other => panic!("expected UserAlreadyExists, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_users_carry_the_lookup_key() {
    let users = service().await;

    match users.get("nope").await.unwrap_err() {
        ServiceError::UserNotFoundById { id } => assert_eq!(id, "nope"),
        other => panic!("unexpected error: {:?}", other),
    }

    match users.get_by_email("ghost@x.com").await.unwrap_err() {
        ServiceError::UserNotFoundByEmail { email } => assert_eq!(email, "ghost@x.com"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn register_rejects_malformed_email() {
    let users = service().await;

    for email in ["", "no-at-sign", "@x.com", "a@nodot", " a@x.com"] {
        let err = users.register(&new_user(email)).await.unwrap_err();
        assert!(
            matches!(err, ServiceError::Validation { .. }),
            "{:?} should be rejected",
            email
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_onto_taken_email_is_a_duplicate() {
    let users = service().await;
    users.register(&new_user("taken@x.com")).await.unwrap();

    let err = users
        .upsert(&UpsertUser {
            id: "other".to_string(),
            email: "taken@x.com".to_string(),
            name: None,
            avatar_url: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::UserAlreadyExists { .. }));
}

#[test]
fn domain_errors_render_offending_key() {
    let err = ServiceError::UserNotFoundByEmail {
        email: "a@x.com".to_string(),
    };
    assert_eq!(err.to_string(), "User not found by email 'a@x.com'");

    let err = ServiceError::UserAlreadyExists {
        email: "a@x.com".to_string(),
    };
    assert_eq!(err.to_string(), "User with email 'a@x.com' already exists");
}
