//! Persistence and HTTP layer for a content production conveyor.
//!
//! Users own projects (each an ordered list of steps) and scripts that move
//! through review. Storage sits behind the [`db::Database`] trait; the
//! [`service`] layer adds ownership and domain errors on top, and [`api`]
//! exposes it over HTTP.

pub mod api;
pub mod cli;
pub mod client;
pub mod db;
pub mod diagnostics;
pub mod paths;
pub mod service;
