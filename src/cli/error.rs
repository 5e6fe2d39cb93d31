use miette::Diagnostic;
use thiserror::Error;

use crate::db::DbError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error("Database file not found: {path}")]
    #[diagnostic(
        code(conveyor::cli::database_missing),
        help("Pass --db /path/to/conveyor.db or set CONVEYOR_DB to an existing database.")
    )]
    DatabaseMissing { path: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Database(#[from] DbError),
}

pub type CliResult<T> = Result<T, CliError>;
