//! V1 API handlers.

mod projects;
mod scripts;
mod users;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod users_test;

pub use projects::*;
pub use scripts::*;
pub use users::*;
