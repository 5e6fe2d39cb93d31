//! Client-side query cache.
//!
//! Holds the last known JSON value per query key and lets callers patch it
//! in place. Staleness and refetching belong to whoever fills the cache.

mod cache;


pub use cache::{QueryCache, QueryHandle};
