//! Application state for the API server.

use std::sync::Arc;

use crate::db::Database;
use crate::service::{ProjectService, ScriptService, UserService};

/// Shared application state.
///
/// Generic over `D: Database` so handlers never name a storage backend.
/// Every service shares the same store handle.
pub struct AppState<D: Database> {
    users: UserService<D>,
    projects: ProjectService<D>,
    scripts: ScriptService<D>,
}

// Manual Clone impl - the services hold Arcs, D itself need not be Clone
impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            projects: self.projects.clone(),
            scripts: self.scripts.clone(),
        }
    }
}

impl<D: Database> AppState<D> {
    pub fn new(db: D) -> Self {
        let db = Arc::new(db);
        Self {
            users: UserService::new(Arc::clone(&db)),
            projects: ProjectService::new(Arc::clone(&db)),
            scripts: ScriptService::new(db),
        }
    }

    pub fn users(&self) -> &UserService<D> {
        &self.users
    }

    pub fn projects(&self) -> &ProjectService<D> {
        &self.projects
    }

    pub fn scripts(&self) -> &ScriptService<D> {
        &self.scripts
    }
}
