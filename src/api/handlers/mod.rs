//! Handlers outside the versioned API.

mod system;

pub use system::*;
