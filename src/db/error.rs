//! Database error types.
//!
//! This module provides abstracted error types for database operations.
//! It uses miette for fancy diagnostic output and thiserror for derive macros.
//! The error types are storage-backend agnostic.

use miette::Diagnostic;
use thiserror::Error;

/// Database operation errors.
///
/// A missing row is not an error at this layer; repositories return `None`.
#[derive(Error, Diagnostic, Debug)]
pub enum DbError {
    #[error("Invalid data: {message} (hint: {help})")]
    #[diagnostic(code(conveyor::db::invalid_data))]
    InvalidData { message: String, help: String },

    #[error("Database error: {message}")]
    #[diagnostic(code(conveyor::db::database_error))]
    Database { message: String },

    #[error("Migration error: {message}")]
    #[diagnostic(code(conveyor::db::migration_error))]
    Migration { message: String },

    #[error("Connection error: {message}")]
    #[diagnostic(code(conveyor::db::connection_error))]
    Connection { message: String },

    #[error("Constraint violation: {message}")]
    #[diagnostic(code(conveyor::db::constraint))]
    Constraint { message: String },
}

impl DbError {
    /// True when the store rejected a write because of a uniqueness rule.
    pub fn is_constraint(&self) -> bool {
        matches!(self, DbError::Constraint { .. })
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
