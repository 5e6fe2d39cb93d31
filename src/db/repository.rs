//! Repository traits for data access abstraction.
//!
//! These traits define the contract for data access, allowing different
//! storage backends to be swapped without changing business logic.
//!
//! Lookups return `Ok(None)` when nothing matches. Scoped lookups also return
//! `Ok(None)` when the row exists under another owner, so callers cannot
//! probe for ids they do not own.

use std::future::Future;

use crate::db::{
    DbResult, ListResult, NewProject, NewProjectStep, NewScript, NewUser, PageSort, Project,
    ProjectQuery, ProjectStatus, ProjectStep, Script, ScriptAnalysis, ScriptPatch, ScriptQuery,
    UpsertUser, User,
};

/// Repository for User operations.
pub trait UserRepository: Send + Sync {
    /// Get a user by ID.
    fn get_by_id(&self, id: &str) -> impl Future<Output = DbResult<Option<User>>> + Send;

    /// Point lookup on the unique email column.
    fn find_by_email(&self, email: &str) -> impl Future<Output = DbResult<Option<User>>> + Send;

    /// Insert a new user and return the stored row.
    ///
    /// A duplicate email fails with `DbError::Constraint`.
    fn create(&self, user: &NewUser) -> impl Future<Output = DbResult<User>> + Send;

    /// Insert the user if the id is unknown, otherwise overwrite its fields
    /// and refresh `updated_at`.
    fn upsert(&self, user: &UpsertUser) -> impl Future<Output = DbResult<User>> + Send;

    /// List users.
    fn list(&self, page: &PageSort) -> impl Future<Output = DbResult<ListResult<User>>> + Send;
}

/// Repository for Project operations.
pub trait ProjectRepository: Send + Sync {
    /// Get a project by ID regardless of owner.
    fn get_by_id(&self, id: &str) -> impl Future<Output = DbResult<Option<Project>>> + Send;

    /// Get a project only if it belongs to `user_id`.
    fn get_scoped(
        &self,
        id: &str,
        user_id: &str,
    ) -> impl Future<Output = DbResult<Option<Project>>> + Send;

    /// Create a new project in `draft` status.
    fn create(&self, project: &NewProject) -> impl Future<Output = DbResult<Project>> + Send;

    /// Create a project together with its initial steps in one transaction.
    fn create_with_steps(
        &self,
        project: &NewProject,
        steps: &[NewProjectStep],
    ) -> impl Future<Output = DbResult<(Project, Vec<ProjectStep>)>> + Send;

    /// List projects owned by `user_id`.
    fn list_for_user(
        &self,
        user_id: &str,
        query: &ProjectQuery,
    ) -> impl Future<Output = DbResult<ListResult<Project>>> + Send;

    /// Change the status of an owned project.
    fn update_status(
        &self,
        id: &str,
        user_id: &str,
        status: ProjectStatus,
    ) -> impl Future<Output = DbResult<Option<Project>>> + Send;

    /// Mark an owned project as deleted. Returns false when nothing matched.
    fn soft_delete(&self, id: &str, user_id: &str) -> impl Future<Output = DbResult<bool>> + Send;
}

/// Repository for the ordered steps of a project.
pub trait ProjectStepRepository: Send + Sync {
    /// Steps of an owned project ordered by `step_order`.
    fn list_for_project(
        &self,
        project_id: &str,
        user_id: &str,
    ) -> impl Future<Output = DbResult<Option<Vec<ProjectStep>>>> + Send;

    /// Insert or replace the step at `step.step_order` of an owned project.
    fn upsert_step(
        &self,
        project_id: &str,
        user_id: &str,
        step: &NewProjectStep,
    ) -> impl Future<Output = DbResult<Option<ProjectStep>>> + Send;
}

/// Repository for Script operations.
pub trait ScriptRepository: Send + Sync {
    /// Get a script by ID regardless of owner.
    fn get_by_id(&self, id: &str) -> impl Future<Output = DbResult<Option<Script>>> + Send;

    /// Get a script only if it belongs to `user_id`.
    fn get_scoped(
        &self,
        id: &str,
        user_id: &str,
    ) -> impl Future<Output = DbResult<Option<Script>>> + Send;

    /// Create a new script in `draft` status.
    fn create(&self, script: &NewScript) -> impl Future<Output = DbResult<Script>> + Send;

    /// Apply a partial update to an owned script.
    fn update(
        &self,
        id: &str,
        user_id: &str,
        patch: &ScriptPatch,
    ) -> impl Future<Output = DbResult<Option<Script>>> + Send;

    /// Attach analysis to an owned script. Drafts move to `analyzed`.
    fn set_analysis(
        &self,
        id: &str,
        user_id: &str,
        analysis: &ScriptAnalysis,
    ) -> impl Future<Output = DbResult<Option<Script>>> + Send;

    /// List scripts owned by `user_id`.
    fn list_for_user(
        &self,
        user_id: &str,
        query: &ScriptQuery,
    ) -> impl Future<Output = DbResult<ListResult<Script>>> + Send;
}

/// Combined database interface.
///
/// Repositories borrow the backend's connection handle, so they are cheap to
/// construct per call.
pub trait Database: Send + Sync {
    type Users<'a>: UserRepository
    where
        Self: 'a;
    type Projects<'a>: ProjectRepository
    where
        Self: 'a;
    type ProjectSteps<'a>: ProjectStepRepository
    where
        Self: 'a;
    type Scripts<'a>: ScriptRepository
    where
        Self: 'a;

    /// Run pending migrations.
    fn migrate(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Get the user repository.
    fn users(&self) -> Self::Users<'_>;

    /// Get the project repository.
    fn projects(&self) -> Self::Projects<'_>;

    /// Get the project step repository.
    fn project_steps(&self) -> Self::ProjectSteps<'_>;

    /// Get the script repository.
    fn scripts(&self) -> Self::Scripts<'_>;
}
