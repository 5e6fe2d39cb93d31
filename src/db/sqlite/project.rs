//! SQLite ProjectRepository implementation.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{debug, instrument};

use super::helpers::{build_limit_offset_clause, build_order_clause, map_sqlx_error, parse_column};
use super::project_step::{insert_step, step_from_row};
use crate::db::utils::{current_timestamp, generate_entity_id};
use crate::db::{
    DbResult, ListResult, NewProject, NewProjectStep, Project, ProjectQuery, ProjectRepository,
    ProjectStatus, ProjectStep,
};

pub(super) const PROJECT_COLUMNS: &str =
    "id, user_id, title, description, status, source_type, source_ref, created_at, updated_at";

/// SQLx-backed project repository.
pub struct SqliteProjectRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

pub(super) fn project_from_row(row: &SqliteRow) -> DbResult<Project> {
    let status: String = row.get("status");
    let source_type: String = row.get("source_type");

    Ok(Project {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        status: parse_column("status", &status)?,
        source_type: parse_column("source_type", &source_type)?,
        source_ref: row.get("source_ref"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

fn project_from_new(id: String, project: &NewProject, timestamp: String) -> Project {
    Project {
        id,
        user_id: project.user_id.clone(),
        title: project.title.clone(),
        description: project.description.clone(),
        status: ProjectStatus::Draft,
        source_type: project.source_type,
        source_ref: project.source_ref.clone(),
        created_at: timestamp.clone(),
        updated_at: timestamp,
    }
}

const INSERT_PROJECT: &str = "INSERT INTO projects (id, user_id, title, description, status, source_type, source_ref, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)";

impl<'a> ProjectRepository for SqliteProjectRepository<'a> {
    #[instrument(skip(self))]
    async fn get_by_id(&self, id: &str) -> DbResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(project_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn get_scoped(&self, id: &str, user_id: &str) -> DbResult<Option<Project>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE id = ? AND user_id = ?",
            PROJECT_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(project_from_row).transpose()
    }

    #[instrument(skip(self, project), fields(user_id = %project.user_id))]
    async fn create(&self, project: &NewProject) -> DbResult<Project> {
        let created = project_from_new(generate_entity_id(), project, current_timestamp());

        sqlx::query(INSERT_PROJECT)
            .bind(&created.id)
            .bind(&created.user_id)
            .bind(&created.title)
            .bind(&created.description)
            .bind(created.status.to_string())
            .bind(created.source_type.to_string())
            .bind(&created.source_ref)
            .bind(&created.created_at)
            .bind(&created.updated_at)
            .execute(self.pool)
            .await
            .map_err(map_sqlx_error)?;

        debug!(project_id = %created.id, "Project created");
        Ok(created)
    }

    #[instrument(skip(self, project, steps), fields(user_id = %project.user_id, steps = steps.len()))]
    async fn create_with_steps(
        &self,
        project: &NewProject,
        steps: &[NewProjectStep],
    ) -> DbResult<(Project, Vec<ProjectStep>)> {
        let now = current_timestamp();
        let created = project_from_new(generate_entity_id(), project, now.clone());

        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        sqlx::query(INSERT_PROJECT)
            .bind(&created.id)
            .bind(&created.user_id)
            .bind(&created.title)
            .bind(&created.description)
            .bind(created.status.to_string())
            .bind(created.source_type.to_string())
            .bind(&created.source_ref)
            .bind(&created.created_at)
            .bind(&created.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

        let mut created_steps = Vec::with_capacity(steps.len());
        for step in steps {
            let row = insert_step(&mut tx, &created.id, step, &now).await?;
            created_steps.push(step_from_row(&row)?);
        }

        // Dropping the transaction without commit rolls back every insert above.
        tx.commit().await.map_err(map_sqlx_error)?;

        debug!(project_id = %created.id, "Project created with steps");
        Ok((created, created_steps))
    }

    #[instrument(skip(self))]
    async fn list_for_user(
        &self,
        user_id: &str,
        query: &ProjectQuery,
    ) -> DbResult<ListResult<Project>> {
        let allowed_fields = ["title", "status", "created_at", "updated_at"];
        let order_clause = build_order_clause(&query.page, &allowed_fields, "created_at");
        let limit_clause = build_limit_offset_clause(&query.page);

        // Without an explicit filter soft-deleted projects stay hidden.
        let (status_condition, status_value) = match query.status {
            Some(status) => ("status = ?", status.to_string()),
            None => ("status != ?", ProjectStatus::Deleted.to_string()),
        };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM projects WHERE user_id = ? AND {} {} {}",
            PROJECT_COLUMNS, status_condition, order_clause, limit_clause
        ))
        .bind(user_id)
        .bind(&status_value)
        .fetch_all(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM projects WHERE user_id = ? AND {}",
            status_condition
        ))
        .bind(user_id)
        .bind(&status_value)
        .fetch_one(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let items = rows
            .iter()
            .map(project_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        Ok(ListResult {
            items,
            total: total as usize,
            limit: query.page.limit,
            offset: query.page.offset.unwrap_or(0),
        })
    }

    #[instrument(skip(self))]
    async fn update_status(
        &self,
        id: &str,
        user_id: &str,
        status: ProjectStatus,
    ) -> DbResult<Option<Project>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE projects
            SET status = ?, updated_at = MAX(updated_at, ?)
            WHERE id = ? AND user_id = ?
            RETURNING {}
            "#,
            PROJECT_COLUMNS
        ))
        .bind(status.to_string())
        .bind(current_timestamp())
        .bind(id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(project_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn soft_delete(&self, id: &str, user_id: &str) -> DbResult<bool> {
        let deleted = self
            .update_status(id, user_id, ProjectStatus::Deleted)
            .await?;
        Ok(deleted.is_some())
    }
}
