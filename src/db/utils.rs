//! Database utility functions.

use chrono::Utc;
use uuid::Uuid;

/// Generate an opaque identifier for a new entity.
pub fn generate_entity_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Get current datetime as a sortable string with millisecond precision.
pub fn current_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
