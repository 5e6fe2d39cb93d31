//! Tests for SqliteUserRepository.

use crate::db::{
    Database, DbError, NewUser, PageSort, SortOrder, SqliteDatabase, UpsertUser, UserRepository,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        email: email.to_string(),
        name: Some("Ada".to_string()),
        avatar_url: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_then_lookup_by_id_and_email() {
    let db = setup_db().await;
    let repo = db.users();

    let created = repo
        .create(&new_user("a@x.com"))
        .await
        .expect("Create should succeed");
    assert!(!created.id.is_empty());
    assert!(!created.created_at.is_empty());

    let by_id = repo
        .get_by_id(&created.id)
        .await
        .expect("Get should succeed")
        .expect("User should exist");
    assert_eq!(by_id, created);

    let by_email = repo
        .find_by_email("a@x.com")
        .await
        .expect("Find should succeed")
        .expect("User should exist");
    assert_eq!(by_email, created);
}

#[tokio::test(flavor = "multi_thread")]
async fn duplicate_email_is_a_constraint_violation() {
    let db = setup_db().await;
    let repo = db.users();

    let first = repo.create(&new_user("a@x.com")).await.unwrap();

    let err = repo
        .create(&new_user("a@x.com"))
        .await
        .expect_err("Duplicate email must fail");
    assert!(matches!(err, DbError::Constraint { .. }), "got {:?}", err);

    // The original row is untouched
    let stored = repo.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_eq!(stored.id, first.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_ids_are_absent_not_errors() {
    let db = setup_db().await;
    let repo = db.users();

    for id in ["", "missing", "00000000000000000000000000000000", "'; DROP TABLE users;--"] {
        let result = repo.get_by_id(id).await.expect("Lookup must not error");
        assert!(result.is_none());
    }
    assert!(repo.find_by_email("nobody@x.com").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_inserts_unknown_id() {
    let db = setup_db().await;
    let repo = db.users();

    let user = repo
        .upsert(&UpsertUser {
            id: "u1".to_string(),
            email: "u1@x.com".to_string(),
            name: None,
            avatar_url: None,
        })
        .await
        .expect("Upsert should insert");

    assert_eq!(user.id, "u1");
    assert_eq!(repo.get_by_id("u1").await.unwrap(), Some(user));
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_is_idempotent_except_for_updated_at() {
    let db = setup_db().await;
    let repo = db.users();

    let fields = UpsertUser {
        id: "u1".to_string(),
        email: "u1@x.com".to_string(),
        name: Some("First".to_string()),
        avatar_url: Some("https://cdn.example/u1.png".to_string()),
    };

    let first = repo.upsert(&fields).await.unwrap();
    let second = repo.upsert(&fields).await.unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(first.email, second.email);
    assert_eq!(first.name, second.name);
    assert_eq!(first.avatar_url, second.avatar_url);
    assert_eq!(first.created_at, second.created_at);
    assert!(second.updated_at >= first.updated_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_overwrites_fields_by_id() {
    let db = setup_db().await;
    let repo = db.users();

    let mut fields = UpsertUser {
        id: "u1".to_string(),
        email: "old@x.com".to_string(),
        name: Some("Old".to_string()),
        avatar_url: None,
    };
    repo.upsert(&fields).await.unwrap();

    fields.email = "new@x.com".to_string();
    fields.name = None;
    let updated = repo.upsert(&fields).await.unwrap();

    assert_eq!(updated.email, "new@x.com");
    assert_eq!(updated.name, None);
    assert!(repo.find_by_email("old@x.com").await.unwrap().is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_onto_another_users_email_fails() {
    let db = setup_db().await;
    let repo = db.users();

    repo.create(&new_user("taken@x.com")).await.unwrap();

    let err = repo
        .upsert(&UpsertUser {
            id: "u2".to_string(),
            email: "taken@x.com".to_string(),
            name: None,
            avatar_url: None,
        })
        .await
        .expect_err("Email belongs to someone else");
    assert!(err.is_constraint());
}

#[tokio::test(flavor = "multi_thread")]
async fn list_users_paginates() {
    let db = setup_db().await;
    let repo = db.users();

    for email in ["c@x.com", "a@x.com", "b@x.com"] {
        repo.create(&new_user(email)).await.unwrap();
    }

    let page = PageSort {
        limit: Some(2),
        offset: Some(0),
        sort_by: Some("email".to_string()),
        sort_order: Some(SortOrder::Asc),
    };
    let result = repo.list(&page).await.unwrap();

    assert_eq!(result.total, 3);
    assert_eq!(result.items.len(), 2);
    assert_eq!(result.items[0].email, "a@x.com");
    assert_eq!(result.items[1].email, "b@x.com");
}
