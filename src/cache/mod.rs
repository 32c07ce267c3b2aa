//! In-memory endpoint cache
//!
//! Maps an endpoint path to the JSON value decoded from its first successful
//! fetch. Entries are never expired or evicted; the cache lives as long as the
//! `DataManager` that owns it.

mod endpoint;

pub use endpoint::{CachedEntry, EndpointCache};
