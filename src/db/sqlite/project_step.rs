//! SQLite ProjectStepRepository implementation.
//!
//! Steps have no owner column of their own; every access joins back to the
//! parent project's `user_id`.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::instrument;

use super::helpers::{map_sqlx_error, parse_column_json};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{DbResult, NewProjectStep, ProjectStep, ProjectStepRepository};

const STEP_COLUMNS: &str = "id, project_id, step_order, step_type, data, created_at, updated_at";

/// SQLx-backed project step repository.
pub struct SqliteProjectStepRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

pub(super) fn step_from_row(row: &SqliteRow) -> DbResult<ProjectStep> {
    let data: String = row.get("data");

    Ok(ProjectStep {
        id: row.get("id"),
        project_id: row.get("project_id"),
        step_order: row.get("step_order"),
        step_type: row.get("step_type"),
        data: parse_column_json("data", &data)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// Insert the step, or replace the one already at the same position.
///
/// Missing step data is stored as an empty object.
pub(super) async fn insert_step(
    conn: &mut SqliteConnection,
    project_id: &str,
    step: &NewProjectStep,
    now: &str,
) -> DbResult<SqliteRow> {
    let data = if step.data.is_null() {
        "{}".to_string()
    } else {
        serde_json::to_string(&step.data).unwrap_or_else(|_| "{}".to_string())
    };

    sqlx::query(&format!(
        r#"
        INSERT INTO project_steps (id, project_id, step_order, step_type, data, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(project_id, step_order) DO UPDATE SET
            step_type = excluded.step_type,
            data = excluded.data,
            updated_at = MAX(project_steps.updated_at, excluded.updated_at)
        RETURNING {}
        "#,
        STEP_COLUMNS
    ))
    .bind(generate_entity_id())
    .bind(project_id)
    .bind(step.step_order)
    .bind(&step.step_type)
    .bind(data)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)
}

async fn owns_project(
    conn: &mut SqliteConnection,
    project_id: &str,
    user_id: &str,
) -> DbResult<bool> {
    let owned: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM projects WHERE id = ? AND user_id = ?)",
    )
    .bind(project_id)
    .bind(user_id)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(owned)
}

impl<'a> ProjectStepRepository for SqliteProjectStepRepository<'a> {
    #[instrument(skip(self))]
    async fn list_for_project(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> DbResult<Option<Vec<ProjectStep>>> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;

        if !owns_project(&mut conn, project_id, user_id).await? {
            return Ok(None);
        }

        let rows = sqlx::query(&format!(
            "SELECT {} FROM project_steps WHERE project_id = ? ORDER BY step_order ASC",
            STEP_COLUMNS
        ))
        .bind(project_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(map_sqlx_error)?;

        rows.iter()
            .map(step_from_row)
            .collect::<DbResult<Vec<_>>>()
            .map(Some)
    }

    #[instrument(skip(self, step), fields(step_order = step.step_order))]
    async fn upsert_step(
        &self,
        project_id: &str,
        user_id: &str,
        step: &NewProjectStep,
    ) -> DbResult<Option<ProjectStep>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        if !owns_project(&mut tx, project_id, user_id).await? {
            return Ok(None);
        }

        let row = insert_step(&mut tx, project_id, step, &current_timestamp()).await?;
        let saved = step_from_row(&row)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(Some(saved))
    }
}
