//! Observability hook for cache and fetch activity
//!
//! Signals are advisory: nothing in the data manager depends on what an
//! observer does with them.

use super::fetcher::FetchError;

/// Receives cache and network events from a `DataManager`
///
/// All methods default to doing nothing, so implementors only override the
/// events they care about.
pub trait FetchObserver: Send + Sync {
    /// The endpoint was served from the cache
    fn cache_hit(&self, _endpoint: &str) {}

    /// The endpoint was not cached and a network fetch is starting
    fn network_fetch(&self, _endpoint: &str) {}

    /// Attempt number `attempt` (1-based) failed and another attempt follows
    fn attempt_failed(&self, _endpoint: &str, _attempt: u32, _error: &FetchError) {}

    /// The fetch gave up; `error` is what the caller receives
    fn fetch_failed(&self, _endpoint: &str, _error: &FetchError) {}
}

/// Observer that discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl FetchObserver for NoopObserver {}

/// Observer that reports events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl FetchObserver for TracingObserver {
    fn cache_hit(&self, endpoint: &str) {
        tracing::info!(endpoint, "Serving data from cache");
    }

    fn network_fetch(&self, endpoint: &str) {
        tracing::info!(endpoint, "Fetching data from API");
    }

    fn attempt_failed(&self, endpoint: &str, attempt: u32, error: &FetchError) {
        tracing::warn!(endpoint, attempt, error = %error, "Attempt failed, retrying");
    }

    fn fetch_failed(&self, endpoint: &str, error: &FetchError) {
        tracing::error!(endpoint, error = %error, "Fetch failed");
    }
}
