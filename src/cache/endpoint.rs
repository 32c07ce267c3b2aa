//! Endpoint-keyed storage for decoded API responses

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A decoded response together with when it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedEntry {
    /// The decoded JSON payload
    pub value: Value,
    /// When the entry was written. Informational only, entries never expire.
    pub cached_at: DateTime<Utc>,
}

impl CachedEntry {
    /// Creates an entry stamped with the current time
    pub fn new(value: Value) -> Self {
        Self {
            value,
            cached_at: Utc::now(),
        }
    }
}

/// Flat endpoint -> value map
///
/// Keys are matched exactly: `/users` and `/users/` are different entries.
#[derive(Debug, Clone, Default)]
pub struct EndpointCache {
    entries: HashMap<String, CachedEntry>,
}

impl EndpointCache {
    /// Creates an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the entry stored for `endpoint`
    pub fn get(&self, endpoint: &str) -> Option<&CachedEntry> {
        self.entries.get(endpoint)
    }

    /// Whether `endpoint` has a stored value
    pub fn contains(&self, endpoint: &str) -> bool {
        self.entries.contains_key(endpoint)
    }

    /// Stores `value` under `endpoint`
    ///
    /// Returns the entry that was replaced, which only happens when two
    /// fetches for the same endpoint raced each other.
    pub fn insert(&mut self, endpoint: impl Into<String>, value: Value) -> Option<CachedEntry> {
        self.entries.insert(endpoint.into(), CachedEntry::new(value))
    }

    /// Number of cached endpoints
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cached endpoints, sorted for stable output
    pub fn endpoints(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
