//! Tests for SqliteProjectStepRepository.

use serde_json::json;

use crate::db::{
    Database, NewProject, NewProjectStep, NewUser, ProjectRepository, ProjectStepRepository,
    SourceType, SqliteDatabase, UserRepository,
};

async fn setup() -> (SqliteDatabase, String, String, String) {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");

    let owner = db
        .users()
        .create(&NewUser {
            email: "owner@x.com".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id;
    let stranger = db
        .users()
        .create(&NewUser {
            email: "stranger@x.com".to_string(),
            ..Default::default()
        })
        .await
        .unwrap()
        .id;
    let project = db
        .projects()
        .create(&NewProject {
            user_id: owner.clone(),
            title: "News digest".to_string(),
            description: None,
            source_type: SourceType::News,
            source_ref: None,
        })
        .await
        .unwrap()
        .id;

    (db, owner, stranger, project)
}

fn step(order: i64, step_type: &str) -> NewProjectStep {
    NewProjectStep {
        step_order: order,
        step_type: step_type.to_string(),
        data: json!({"order": order}),
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn steps_are_listed_in_order() {
    let (db, owner, _, project) = setup().await;
    let repo = db.project_steps();

    for (order, kind) in [(3, "render"), (1, "research"), (2, "script")] {
        repo.upsert_step(&project, &owner, &step(order, kind))
            .await
            .unwrap()
            .expect("Owner can add steps");
    }

    let steps = repo
        .list_for_project(&project, &owner)
        .await
        .unwrap()
        .unwrap();
    let kinds: Vec<&str> = steps.iter().map(|s| s.step_type.as_str()).collect();
    assert_eq!(kinds, vec!["research", "script", "render"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn upsert_step_replaces_step_at_same_position() {
    let (db, owner, _, project) = setup().await;
    let repo = db.project_steps();

    let first = repo
        .upsert_step(&project, &owner, &step(1, "research"))
        .await
        .unwrap()
        .unwrap();

    let mut replacement = step(1, "research");
    replacement.data = json!({"notes": "updated"});
    let second = repo
        .upsert_step(&project, &owner, &replacement)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.data, json!({"notes": "updated"}));
    assert!(second.updated_at >= first.updated_at);

    let steps = repo
        .list_for_project(&project, &owner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(steps.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn steps_inherit_project_ownership() {
    let (db, owner, stranger, project) = setup().await;
    let repo = db.project_steps();

    repo.upsert_step(&project, &owner, &step(1, "research"))
        .await
        .unwrap();

    assert!(
        repo.list_for_project(&project, &stranger)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        repo.upsert_step(&project, &stranger, &step(2, "script"))
            .await
            .unwrap()
            .is_none()
    );

    let steps = repo
        .list_for_project(&project, &owner)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(steps.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_project_has_no_steps() {
    let (db, owner, _, _) = setup().await;

    let steps = db
        .project_steps()
        .list_for_project("missing", &owner)
        .await
        .unwrap();
    assert!(steps.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_step_data_is_stored_as_empty_object() {
    let (db, owner, _, project) = setup().await;

    let mut bare = step(1, "research");
    bare.data = serde_json::Value::Null;
    let saved = db
        .project_steps()
        .upsert_step(&project, &owner, &bare)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.data, json!({}));

    let (_, steps) = db
        .projects()
        .create_with_steps(
            &NewProject {
                user_id: owner.clone(),
                title: "Bare steps".to_string(),
                description: None,
                source_type: SourceType::Custom,
                source_ref: None,
            },
            &[bare],
        )
        .await
        .unwrap();
    assert_eq!(steps[0].data, json!({}));

    let raw: String = sqlx::query_scalar("SELECT data FROM project_steps WHERE id = ?")
        .bind(&saved.id)
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(raw, "{}");
}
