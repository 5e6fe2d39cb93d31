//! Tests for SqliteProjectRepository.

use crate::db::{
    Database, NewProject, NewProjectStep, NewUser, PageSort, ProjectQuery, ProjectRepository,
    ProjectStatus, ProjectStepRepository, SourceType, SqliteDatabase, UserRepository,
};

async fn setup_db() -> SqliteDatabase {
    let db = SqliteDatabase::in_memory()
        .await
        .expect("Failed to create in-memory database");
    db.migrate().await.expect("Migration should succeed");
    db
}

async fn create_user(db: &SqliteDatabase, email: &str) -> String {
    db.users()
        .create(&NewUser {
            email: email.to_string(),
            ..Default::default()
        })
        .await
        .expect("User create should succeed")
        .id
}

fn new_project(user_id: &str, title: &str) -> NewProject {
    NewProject {
        user_id: user_id.to_string(),
        title: title.to_string(),
        description: None,
        source_type: SourceType::Custom,
        source_ref: None,
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn create_returns_server_assigned_fields() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;

    let project = db
        .projects()
        .create(&new_project(&u1, "Launch reel"))
        .await
        .expect("Create should succeed");

    assert!(!project.id.is_empty());
    assert_eq!(project.status, ProjectStatus::Draft);
    assert_eq!(project.created_at, project.updated_at);

    let stored = db.projects().get_by_id(&project.id).await.unwrap();
    assert_eq!(stored, Some(project));
}

#[tokio::test(flavor = "multi_thread")]
async fn scoped_read_hides_other_owners_projects() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;
    let u2 = create_user(&db, "u2@x.com").await;
    let repo = db.projects();

    let project = repo.create(&new_project(&u1, "Mine")).await.unwrap();

    let owned = repo.get_scoped(&project.id, &u1).await.unwrap();
    assert_eq!(owned.map(|p| p.id), Some(project.id.clone()));

    let foreign = repo.get_scoped(&project.id, &u2).await.unwrap();
    assert!(foreign.is_none());

    let missing = repo.get_scoped("missing", &u1).await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn project_for_unknown_owner_is_rejected() {
    let db = setup_db().await;

    let result = db.projects().create(&new_project("ghost", "Orphan")).await;
    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread")]
async fn update_status_requires_ownership() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;
    let u2 = create_user(&db, "u2@x.com").await;
    let repo = db.projects();

    let project = repo.create(&new_project(&u1, "Mine")).await.unwrap();

    let denied = repo
        .update_status(&project.id, &u2, ProjectStatus::Completed)
        .await
        .unwrap();
    assert!(denied.is_none());

    let updated = repo
        .update_status(&project.id, &u1, ProjectStatus::Completed)
        .await
        .unwrap()
        .expect("Owner can update");
    assert_eq!(updated.status, ProjectStatus::Completed);
    assert!(updated.updated_at >= project.updated_at);
}

#[tokio::test(flavor = "multi_thread")]
async fn soft_delete_keeps_row_and_hides_from_default_listing() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;
    let repo = db.projects();

    let keep = repo.create(&new_project(&u1, "Keep")).await.unwrap();
    let gone = repo.create(&new_project(&u1, "Gone")).await.unwrap();

    assert!(repo.soft_delete(&gone.id, &u1).await.unwrap());

    let still_there = repo.get_by_id(&gone.id).await.unwrap().unwrap();
    assert_eq!(still_there.status, ProjectStatus::Deleted);

    let listed = repo
        .list_for_user(&u1, &ProjectQuery::default())
        .await
        .unwrap();
    assert_eq!(listed.total, 1);
    assert_eq!(listed.items[0].id, keep.id);

    let deleted = repo
        .list_for_user(
            &u1,
            &ProjectQuery {
                status: Some(ProjectStatus::Deleted),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(deleted.total, 1);
    assert_eq!(deleted.items[0].id, gone.id);
}

#[tokio::test(flavor = "multi_thread")]
async fn soft_delete_of_foreign_project_reports_no_match() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;
    let u2 = create_user(&db, "u2@x.com").await;
    let repo = db.projects();

    let project = repo.create(&new_project(&u1, "Mine")).await.unwrap();

    assert!(!repo.soft_delete(&project.id, &u2).await.unwrap());
    let untouched = repo.get_by_id(&project.id).await.unwrap().unwrap();
    assert_eq!(untouched.status, ProjectStatus::Draft);
}

#[tokio::test(flavor = "multi_thread")]
async fn list_for_user_only_returns_own_projects() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;
    let u2 = create_user(&db, "u2@x.com").await;
    let repo = db.projects();

    for title in ["One", "Two", "Three"] {
        repo.create(&new_project(&u1, title)).await.unwrap();
    }
    repo.create(&new_project(&u2, "Other")).await.unwrap();

    let page = repo
        .list_for_user(
            &u1,
            &ProjectQuery {
                page: PageSort {
                    limit: Some(2),
                    ..Default::default()
                },
                status: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|p| p.user_id == u1));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_steps_persists_everything() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;

    let mut source = new_project(&u1, "From Instagram");
    source.source_type = SourceType::Instagram;
    source.source_ref = Some("ig-media-42".to_string());

    let steps = vec![
        NewProjectStep {
            step_order: 1,
            step_type: "transcribe".to_string(),
            data: serde_json::json!({"media": "ig-media-42"}),
        },
        NewProjectStep {
            step_order: 2,
            step_type: "script".to_string(),
            data: serde_json::json!({}),
        },
    ];

    let (project, created_steps) = db
        .projects()
        .create_with_steps(&source, &steps)
        .await
        .expect("Create should succeed");

    assert_eq!(project.source_type, SourceType::Instagram);
    assert_eq!(created_steps.len(), 2);

    let stored = db
        .project_steps()
        .list_for_project(&project.id, &u1)
        .await
        .unwrap()
        .expect("Owner can list steps");
    assert_eq!(stored, created_steps);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_with_steps_rolls_back_on_failure() {
    let db = setup_db().await;
    let u1 = create_user(&db, "u1@x.com").await;

    // Reject the second step so the transaction has to unwind.
    sqlx::query("CREATE TRIGGER reject_bad_step BEFORE INSERT ON project_steps WHEN NEW.step_type = 'boom' BEGIN SELECT RAISE(ABORT, 'rejected'); END")
        .execute(db.pool())
        .await
        .unwrap();

    let steps = vec![
        NewProjectStep {
            step_order: 1,
            step_type: "transcribe".to_string(),
            data: serde_json::json!({}),
        },
        NewProjectStep {
            step_order: 2,
            step_type: "boom".to_string(),
            data: serde_json::json!({}),
        },
    ];

    let result = db
        .projects()
        .create_with_steps(&new_project(&u1, "Atomic"), &steps)
        .await;
    assert!(result.is_err());

    let projects: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM projects")
        .fetch_one(db.pool())
        .await
        .unwrap();
    let steps: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM project_steps")
        .fetch_one(db.pool())
        .await
        .unwrap();
    assert_eq!(projects, 0);
    assert_eq!(steps, 0);
}
