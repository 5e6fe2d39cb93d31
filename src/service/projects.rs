//! Project lifecycle and step management.

use std::sync::Arc;

use tracing::{info, instrument};

use super::{ServiceError, ServiceResult};
use crate::db::{
    Database, ListResult, NewProject, NewProjectStep, Project, ProjectQuery, ProjectRepository,
    ProjectStatus, ProjectStep, ProjectStepRepository, UserRepository,
};

/// Domain operations on projects and their steps.
///
/// Every read and write is scoped to the calling user.
pub struct ProjectService<D: Database> {
    db: Arc<D>,
}

impl<D: Database> Clone for ProjectService<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
        }
    }
}

fn validate_new_project(project: &NewProject) -> ServiceResult<()> {
    if project.title.trim().is_empty() {
        return Err(ServiceError::Validation {
            message: "Project title cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_steps(steps: &[NewProjectStep]) -> ServiceResult<()> {
    let mut seen = std::collections::HashSet::new();
    for step in steps {
        if step.step_type.trim().is_empty() {
            return Err(ServiceError::Validation {
                message: format!("Step {} has no type", step.step_order),
            });
        }
        if !seen.insert(step.step_order) {
            return Err(ServiceError::Validation {
                message: format!("Step order {} is used twice", step.step_order),
            });
        }
    }
    Ok(())
}

impl<D: Database> ProjectService<D> {
    pub fn new(db: Arc<D>) -> Self {
        Self { db }
    }

    /// Fetch a project owned by `user_id`.
    pub async fn get(&self, id: &str, user_id: &str) -> ServiceResult<Project> {
        self.db
            .projects()
            .get_scoped(id, user_id)
            .await?
            .ok_or_else(|| ServiceError::ProjectNotFound { id: id.to_string() })
    }

    /// Create a project, optionally seeded with its first steps.
    ///
    /// The project and the steps are written atomically.
    #[instrument(skip(self, project, steps), fields(user_id = %project.user_id))]
    pub async fn create(
        &self,
        project: &NewProject,
        steps: &[NewProjectStep],
    ) -> ServiceResult<(Project, Vec<ProjectStep>)> {
        validate_new_project(project)?;
        validate_steps(steps)?;

        if self.db.users().get_by_id(&project.user_id).await?.is_none() {
            return Err(ServiceError::UserNotFoundById {
                id: project.user_id.clone(),
            });
        }

        let created = if steps.is_empty() {
            (self.db.projects().create(project).await?, Vec::new())
        } else {
            self.db.projects().create_with_steps(project, steps).await?
        };

        info!(project_id = %created.0.id, source = %created.0.source_type, "Project created");
        Ok(created)
    }

    pub async fn list(
        &self,
        user_id: &str,
        query: &ProjectQuery,
    ) -> ServiceResult<ListResult<Project>> {
        Ok(self.db.projects().list_for_user(user_id, query).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_status(
        &self,
        id: &str,
        user_id: &str,
        status: ProjectStatus,
    ) -> ServiceResult<Project> {
        self.db
            .projects()
            .update_status(id, user_id, status)
            .await?
            .ok_or_else(|| ServiceError::ProjectNotFound { id: id.to_string() })
    }

    /// Soft-delete a project.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str, user_id: &str) -> ServiceResult<()> {
        if self.db.projects().soft_delete(id, user_id).await? {
            info!(project_id = %id, "Project marked deleted");
            Ok(())
        } else {
            Err(ServiceError::ProjectNotFound { id: id.to_string() })
        }
    }

    pub async fn steps(&self, project_id: &str, user_id: &str) -> ServiceResult<Vec<ProjectStep>> {
        self.db
            .project_steps()
            .list_for_project(project_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::ProjectNotFound {
                id: project_id.to_string(),
            })
    }

    pub async fn save_step(
        &self,
        project_id: &str,
        user_id: &str,
        step: &NewProjectStep,
    ) -> ServiceResult<ProjectStep> {
        validate_steps(std::slice::from_ref(step))?;

        self.db
            .project_steps()
            .upsert_step(project_id, user_id, step)
            .await?
            .ok_or_else(|| ServiceError::ProjectNotFound {
                id: project_id.to_string(),
            })
    }
}
