//! Domain errors raised above the storage layer.

use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;

/// Domain violations detected while serving a request.
///
/// Every variant carries the key that triggered it.
#[derive(Error, Diagnostic, Debug)]
pub enum ServiceError {
    #[error("User with email '{email}' already exists")]
    #[diagnostic(code(conveyor::service::user_already_exists))]
    UserAlreadyExists { email: String },

    #[error("User not found by id '{id}'")]
    #[diagnostic(code(conveyor::service::user_not_found_by_id))]
    UserNotFoundById { id: String },

    #[error("User not found by email '{email}'")]
    #[diagnostic(code(conveyor::service::user_not_found_by_email))]
    UserNotFoundByEmail { email: String },

    #[error("Project '{id}' not found")]
    #[diagnostic(code(conveyor::service::project_not_found))]
    ProjectNotFound { id: String },

    #[error("Script '{id}' not found")]
    #[diagnostic(code(conveyor::service::script_not_found))]
    ScriptNotFound { id: String },

    #[error("Validation error: {message}")]
    #[diagnostic(code(conveyor::service::validation))]
    Validation { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] DbError),
}

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;
