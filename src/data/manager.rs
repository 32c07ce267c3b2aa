//! Cached access to a JSON API
//!
//! `DataManager` answers every request from its endpoint cache when it can and
//! falls back to the retrying fetcher otherwise. Filter and sort views are
//! built on top of `get_data`, so they populate and reuse the same cache.

use std::cmp::Ordering;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::RwLock;

use super::fetcher::{FetchError, RetryConfig, RetryingFetcher};
use super::observer::{FetchObserver, TracingObserver};
use super::transport::{ReqwestTransport, Transport};
use super::views;
use crate::cache::EndpointCache;

/// Errors returned by `DataManager` operations
#[derive(Debug, Error)]
pub enum DataError {
    /// Fetching the endpoint failed for good
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A view was requested over data that is not a JSON array
    #[error("Data for '{endpoint}' is a JSON {found}, expected an array")]
    NotASequence { endpoint: String, found: &'static str },
}

/// Fetches, caches and slices JSON data from one API base URL
///
/// Cloning a `DataManager` is not supported; share it behind an `Arc` if
/// several tasks need it. All operations take `&self`.
pub struct DataManager {
    fetcher: RetryingFetcher,
    cache: RwLock<EndpointCache>,
    observer: Arc<dyn FetchObserver>,
}

impl std::fmt::Debug for DataManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataManager")
            .field("fetcher", &self.fetcher)
            .finish_non_exhaustive()
    }
}

impl DataManager {
    /// Creates a manager with the default reqwest transport, three attempts
    /// per fetch and `tracing` output
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    /// Starts building a manager for `base_url`
    pub fn builder(base_url: impl Into<String>) -> DataManagerBuilder {
        DataManagerBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        self.fetcher.base_url()
    }

    /// Maximum number of attempts per fetch
    pub fn retries(&self) -> u32 {
        self.fetcher.config().retries
    }

    /// Fetches `endpoint` from the network, bypassing the cache entirely
    ///
    /// The result is not stored. Use `get_data` for cached access.
    pub async fn fetch_with_retry(&self, endpoint: &str) -> Result<Value, FetchError> {
        self.fetcher.fetch_with_retry(endpoint).await
    }

    /// Returns the data for `endpoint`, fetching it on a cache miss
    ///
    /// # Behavior
    /// - A cached endpoint is returned without any network I/O
    /// - A miss runs the retrying fetcher; success is stored, failure is not
    /// - Concurrent misses on the same endpoint are not coalesced: each one
    ///   fetches, and the last to finish owns the cache entry
    pub async fn get_data(&self, endpoint: &str) -> Result<Value, DataError> {
        if let Some(entry) = self.cache.read().await.get(endpoint) {
            self.observer.cache_hit(endpoint);
            return Ok(entry.value.clone());
        }

        self.observer.network_fetch(endpoint);
        let value = self.fetcher.fetch_with_retry(endpoint).await?;

        let replaced = self
            .cache
            .write()
            .await
            .insert(endpoint, value.clone());
        if replaced.is_some() {
            tracing::debug!(endpoint, "Concurrent fetch replaced cache entry");
        }

        Ok(value)
    }

    /// Elements of the endpoint's array for which `predicate` holds
    ///
    /// # Returns
    /// * `Ok(Vec<Value>)` - Matching elements in their original order
    /// * `Err(DataError::NotASequence)` - If the endpoint's data is not an array
    /// * `Err(DataError::Fetch)` - If the data could not be fetched
    pub async fn filter_data<P>(&self, endpoint: &str, predicate: P) -> Result<Vec<Value>, DataError>
    where
        P: Fn(&Value) -> bool,
    {
        let data = self.get_data(endpoint).await?;
        let items = as_sequence(endpoint, &data)?;
        Ok(views::filter_items(items, predicate))
    }

    /// The endpoint's array ordered by `compare`, leaving the cached copy as is
    ///
    /// # Returns
    /// * `Ok(Vec<Value>)` - A stably sorted copy of the data
    /// * `Err(DataError::NotASequence)` - If the endpoint's data is not an array
    /// * `Err(DataError::Fetch)` - If the data could not be fetched
    pub async fn sort_data<C>(&self, endpoint: &str, compare: C) -> Result<Vec<Value>, DataError>
    where
        C: FnMut(&Value, &Value) -> Ordering,
    {
        let data = self.get_data(endpoint).await?;
        let items = as_sequence(endpoint, &data)?;
        Ok(views::sort_items(items, compare))
    }

    /// Whether `endpoint` is already cached
    pub async fn is_cached(&self, endpoint: &str) -> bool {
        self.cache.read().await.contains(endpoint)
    }

    /// The cached value for `endpoint`, without touching the network
    pub async fn cached(&self, endpoint: &str) -> Option<Value> {
        self.cache
            .read()
            .await
            .get(endpoint)
            .map(|entry| entry.value.clone())
    }

    /// Number of cached endpoints
    pub async fn cached_len(&self) -> usize {
        self.cache.read().await.len()
    }
}

fn as_sequence<'a>(endpoint: &str, data: &'a Value) -> Result<&'a [Value], DataError> {
    match data {
        Value::Array(items) => Ok(items),
        other => Err(DataError::NotASequence {
            endpoint: endpoint.to_string(),
            found: views::kind(other),
        }),
    }
}

/// Builder for `DataManager`
pub struct DataManagerBuilder {
    base_url: String,
    config: RetryConfig,
    transport: Option<Arc<dyn Transport>>,
    observer: Arc<dyn FetchObserver>,
}

impl DataManagerBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            config: RetryConfig::default(),
            transport: None,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Maximum number of attempts per fetch (default 3)
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Whether undecodable 2xx bodies are retried (default true)
    pub fn retry_on_decode(mut self, retry: bool) -> Self {
        self.config.retry_on_decode = retry;
        self
    }

    /// Replaces the whole retry configuration
    pub fn retry_config(mut self, config: RetryConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `transport` instead of the default reqwest client
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Uses an already shared transport
    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sends cache and fetch events to `observer` instead of `tracing`
    pub fn observer(mut self, observer: impl FetchObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Uses an already shared observer
    pub fn shared_observer(mut self, observer: Arc<dyn FetchObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn build(self) -> DataManager {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::new()));
        let fetcher = RetryingFetcher::new(
            self.base_url,
            self.config,
            transport,
            self.observer.clone(),
        );

        DataManager {
            fetcher,
            cache: RwLock::new(EndpointCache::new()),
            observer: self.observer,
        }
    }
}
