//! Bounded-retry JSON fetcher
//!
//! Issues a GET against `base_url + endpoint`, treats transport errors,
//! non-2xx statuses and (by default) undecodable bodies as failed attempts,
//! and retries immediately until the attempt budget is spent.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use super::observer::FetchObserver;
use super::transport::{Transport, TransportError};

/// Default maximum number of attempts per fetch
pub const DEFAULT_RETRIES: u32 = 3;

/// Errors that can occur while fetching an endpoint
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request could not be completed
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The server answered with a non-2xx status
    #[error("HTTP error {status}: {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The body of a 2xx response was not valid JSON
    #[error("Failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Every allowed attempt failed; `source` is the last failure
    #[error("Giving up after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// The innermost attempt-level error
    pub fn root_cause(&self) -> &FetchError {
        let mut current = self;
        while let FetchError::RetriesExhausted { source, .. } = current {
            current = source;
        }
        current
    }

    /// HTTP status of the underlying failure, if the server answered
    pub fn status(&self) -> Option<u16> {
        match self.root_cause() {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Retry behaviour for a fetcher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, counting the first one.
    /// Zero behaves like one: the first failure is terminal.
    pub retries: u32,
    /// Whether a 2xx response with an undecodable body counts as a failed
    /// attempt. When false a decode failure is returned immediately.
    pub retry_on_decode: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            retry_on_decode: true,
        }
    }
}

/// Fetches and decodes JSON from `base_url + endpoint` with bounded retries
#[derive(Clone)]
pub struct RetryingFetcher {
    base_url: String,
    config: RetryConfig,
    transport: Arc<dyn Transport>,
    observer: Arc<dyn FetchObserver>,
}

impl std::fmt::Debug for RetryingFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryingFetcher")
            .field("base_url", &self.base_url)
            .field("config", &self.config)
            .finish()
    }
}

impl RetryingFetcher {
    /// Creates a fetcher for `base_url` using the given transport and observer
    pub fn new(
        base_url: impl Into<String>,
        config: RetryConfig,
        transport: Arc<dyn Transport>,
        observer: Arc<dyn FetchObserver>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            config,
            transport,
            observer,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> RetryConfig {
        self.config
    }

    /// Full request URL for an endpoint. The endpoint is appended verbatim.
    pub fn url_for(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Fetches `endpoint`, retrying failed attempts immediately
    ///
    /// # Returns
    /// * `Ok(Value)` - The decoded body of the first successful attempt
    /// * `Err(FetchError::RetriesExhausted)` - If every allowed attempt failed
    /// * `Err(FetchError::Decode)` - If decoding failed and `retry_on_decode` is off
    pub async fn fetch_with_retry(&self, endpoint: &str) -> Result<Value, FetchError> {
        let url = self.url_for(endpoint);
        let mut attempts: u32 = 0;

        loop {
            let error = match self.attempt(&url).await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if matches!(error, FetchError::Decode(_)) && !self.config.retry_on_decode {
                self.observer.fetch_failed(endpoint, &error);
                return Err(error);
            }

            attempts += 1;
            if attempts < self.config.retries {
                self.observer.attempt_failed(endpoint, attempts, &error);
                continue;
            }

            let error = FetchError::RetriesExhausted {
                attempts,
                source: Box::new(error),
            };
            self.observer.fetch_failed(endpoint, &error);
            return Err(error);
        }
    }

    /// One GET plus decode
    async fn attempt(&self, url: &str) -> Result<Value, FetchError> {
        tracing::debug!(url, "Sending request");
        let response = self.transport.get(url).await?;

        if !response.is_success() {
            return Err(FetchError::HttpStatus {
                status: response.status,
                reason: response.reason.unwrap_or_default(),
            });
        }

        Ok(serde_json::from_slice(&response.body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::observer::NoopObserver;
    use crate::data::transport::HttpResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    /// Transport that replays a fixed script and counts calls
    struct ScriptedTransport {
        script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
        calls: AtomicU32,
        urls: Mutex<Vec<String>>,
    }

    impl ScriptedTransport {
        fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU32::new(0),
                urls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.urls.lock().unwrap().push(url.to_string());
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other("script exhausted".to_string())))
        }
    }

    /// Observer that records how many retries were announced
    #[derive(Default)]
    struct CountingObserver {
        retries: AtomicU32,
        failures: AtomicU32,
    }

    impl FetchObserver for CountingObserver {
        fn attempt_failed(&self, _endpoint: &str, _attempt: u32, _error: &FetchError) {
            self.retries.fetch_add(1, Ordering::SeqCst);
        }

        fn fetch_failed(&self, _endpoint: &str, _error: &FetchError) {
            self.failures.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn fetcher(transport: Arc<ScriptedTransport>, retries: u32) -> RetryingFetcher {
        RetryingFetcher::new(
            "https://api.example.test",
            RetryConfig {
                retries,
                ..RetryConfig::default()
            },
            transport,
            Arc::new(NoopObserver),
        )
    }

    fn ok(body: &str) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(200, body))
    }

    fn status(code: u16) -> Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(code, ""))
    }

    fn refused() -> Result<HttpResponse, TransportError> {
        Err(TransportError::Other("connection refused".to_string()))
    }

    #[test]
    fn test_default_config() {
        let config = RetryConfig::default();
        assert_eq!(config.retries, 3);
        assert!(config.retry_on_decode);
    }

    #[test]
    fn test_url_is_concatenated_verbatim() {
        let f = fetcher(ScriptedTransport::new(vec![]), 3);
        assert_eq!(f.url_for("/users"), "https://api.example.test/users");
        assert_eq!(f.url_for("users?id=1"), "https://api.example.testusers?id=1");
        assert_eq!(f.url_for(""), "https://api.example.test");
    }

    #[tokio::test]
    async fn test_first_attempt_success() {
        let transport = ScriptedTransport::new(vec![ok(r#"{"id": 1}"#)]);
        let f = fetcher(transport.clone(), 3);

        let value = f.fetch_with_retry("/users/1").await.unwrap();

        assert_eq!(value, json!({"id": 1}));
        assert_eq!(transport.calls(), 1);
        assert_eq!(
            transport.urls.lock().unwrap().as_slice(),
            ["https://api.example.test/users/1"]
        );
    }

    #[tokio::test]
    async fn test_success_after_failures_within_budget() {
        let transport = ScriptedTransport::new(vec![refused(), status(503), ok("[1, 2]")]);
        let f = fetcher(transport.clone(), 3);

        let value = f.fetch_with_retry("/items").await.unwrap();

        assert_eq!(value, json!([1, 2]));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test]
    async fn test_always_failing_stops_after_budget() {
        let transport = ScriptedTransport::new((0..10).map(|_| status(500)).collect());
        let f = fetcher(transport.clone(), 4);

        let err = f.fetch_with_retry("/items").await.unwrap_err();

        assert_eq!(transport.calls(), 4);
        match &err {
            FetchError::RetriesExhausted { attempts, source } => {
                assert_eq!(*attempts, 4);
                assert!(matches!(**source, FetchError::HttpStatus { status: 500, .. }));
            }
            other => panic!("expected RetriesExhausted, got {other:?}"),
        }
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_last_failure_is_reported() {
        let transport = ScriptedTransport::new(vec![status(500), refused()]);
        let f = fetcher(transport.clone(), 2);

        let err = f.fetch_with_retry("/items").await.unwrap_err();

        assert!(matches!(err.root_cause(), FetchError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn test_zero_and_one_retries_make_a_single_attempt() {
        for retries in [0, 1] {
            let transport = ScriptedTransport::new(vec![status(502), ok("[]")]);
            let f = fetcher(transport.clone(), retries);

            let err = f.fetch_with_retry("/items").await.unwrap_err();

            assert_eq!(transport.calls(), 1, "retries = {retries}");
            assert!(matches!(
                err,
                FetchError::RetriesExhausted { attempts: 1, .. }
            ));
        }
    }

    #[tokio::test]
    async fn test_decode_failure_is_retried_by_default() {
        let transport = ScriptedTransport::new(vec![ok("not json"), ok(r#"["ok"]"#)]);
        let f = fetcher(transport.clone(), 3);

        let value = f.fetch_with_retry("/items").await.unwrap();

        assert_eq!(value, json!(["ok"]));
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_decode_failure_is_terminal_when_disabled() {
        let transport = ScriptedTransport::new(vec![ok("{broken"), ok("[]")]);
        let f = RetryingFetcher::new(
            "https://api.example.test",
            RetryConfig {
                retries: 3,
                retry_on_decode: false,
            },
            transport.clone(),
            Arc::new(NoopObserver),
        );

        let err = f.fetch_with_retry("/items").await.unwrap_err();

        assert!(matches!(err, FetchError::Decode(_)));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_observer_sees_each_retry_and_the_final_failure() {
        let transport = ScriptedTransport::new((0..3).map(|_| status(500)).collect());
        let observer = Arc::new(CountingObserver::default());
        let f = RetryingFetcher::new(
            "https://api.example.test",
            RetryConfig::default(),
            transport,
            observer.clone(),
        );

        let _ = f.fetch_with_retry("/items").await;

        // Two retries announced, the third failure is terminal
        assert_eq!(observer.retries.load(Ordering::SeqCst), 2);
        assert_eq!(observer.failures.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_independent_calls_have_independent_budgets() {
        let transport = ScriptedTransport::new(vec![status(500), ok("1"), status(500), ok("2")]);
        let f = fetcher(transport.clone(), 2);

        assert_eq!(f.fetch_with_retry("/a").await.unwrap(), json!(1));
        assert_eq!(f.fetch_with_retry("/b").await.unwrap(), json!(2));
        assert_eq!(transport.calls(), 4);
    }
}
