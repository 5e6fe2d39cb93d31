//! Service layer.
//!
//! Services wrap repository calls and turn absent rows or rejected writes
//! into named [`ServiceError`] variants. They hold the store handle behind an
//! `Arc` so the HTTP layer can share one instance.

mod error;
mod projects;
mod scripts;
mod users;

#[cfg(test)]
mod users_test;

pub use error::{ServiceError, ServiceResult};
pub use projects::ProjectService;
pub use scripts::ScriptService;
pub use users::UserService;
