//! SQLite implementation of the database traits.
//!
//! This module provides a SQLx-backed implementation of the repository
//! traits defined in the parent module.

mod connection;
mod helpers;
mod project;
mod project_step;
mod script;
mod user;

#[cfg(test)]
mod connection_test;
#[cfg(test)]
mod project_step_test;
#[cfg(test)]
mod project_test;
#[cfg(test)]
mod user_test;

pub use connection::SqliteDatabase;
pub(crate) use helpers::map_sqlx_error;
pub use project::SqliteProjectRepository;
pub use project_step::SqliteProjectStepRepository;
pub use script::SqliteScriptRepository;
pub use user::SqliteUserRepository;
