//! Keyed JSON cache with shallow-merge updates.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde_json::Value;

/// Shared cache of query results keyed by a string.
#[derive(Clone, Default)]
pub struct QueryCache {
    entries: Arc<RwLock<HashMap<String, Value>>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value cached under `key`.
    pub fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Replace the value under `key`.
    pub fn set(&self, key: &str, value: Value) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), value);
    }

    /// Shallow-merge `patch` into the value under `key` and return the result.
    ///
    /// Top-level fields of an object patch overwrite fields of a cached
    /// object; nested objects are replaced, not merged. Any other combination
    /// replaces the cached value with the patch.
    pub fn merge(&self, key: &str, patch: Value) -> Value {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());

        let merged = match (entries.remove(key), patch) {
            (Some(Value::Object(mut current)), Value::Object(fields)) => {
                current.extend(fields);
                Value::Object(current)
            }
            (_, patch) => patch,
        };

        entries.insert(key.to_string(), merged.clone());
        merged
    }

    /// Drop the value under `key`.
    pub fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    /// Bind this cache to a fixed key.
    pub fn handle(&self, key: impl Into<String>) -> QueryHandle {
        QueryHandle {
            cache: self.clone(),
            key: key.into(),
        }
    }
}

/// A cache view pinned to one query key.
#[derive(Clone)]
pub struct QueryHandle {
    cache: QueryCache,
    key: String,
}

impl QueryHandle {
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current cached value, if any.
    pub fn value(&self) -> Option<Value> {
        self.cache.get(&self.key)
    }

    /// Shallow-merge `patch` into the cached value.
    pub fn set(&self, patch: Value) -> Value {
        self.cache.merge(&self.key, patch)
    }
}
