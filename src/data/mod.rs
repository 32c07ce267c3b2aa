//! Fetching, caching and viewing remote JSON data
//!
//! The pieces compose bottom-up: a `Transport` performs single GETs, the
//! `RetryingFetcher` turns those into bounded-retry decoded values, and the
//! `DataManager` memoizes them per endpoint and offers filter/sort views.

pub mod fetcher;
pub mod manager;
pub mod observer;
pub mod transport;
pub mod views;

pub use fetcher::{FetchError, RetryConfig, RetryingFetcher, DEFAULT_RETRIES};
pub use manager::{DataError, DataManager, DataManagerBuilder};
pub use observer::{FetchObserver, NoopObserver, TracingObserver};
pub use transport::{HttpResponse, ReqwestTransport, Transport, TransportError};
