//! Command-line interface parsing for jsonfetch
//!
//! This module handles parsing of CLI arguments using clap and turning them
//! into a validated `StartupConfig` for the demo run in `main.rs`.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::{RetryConfig, DEFAULT_RETRIES};

/// API used when no base URL is given
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The base URL is not an http(s) URL
    #[error("Invalid base URL: '{0}'. Expected an http:// or https:// URL")]
    InvalidBaseUrl(String),

    /// No endpoint was given
    #[error("No endpoints given")]
    NoEndpoints,

    /// The filter limit is NaN or infinite
    #[error("Invalid filter limit: {0}. Expected a finite number")]
    InvalidLimit(f64),
}

/// jsonfetch - fetch, cache, filter and sort JSON from an HTTP API
#[derive(Parser, Debug)]
#[command(name = "jsonfetch")]
#[command(about = "Fetch JSON endpoints with retries, then filter and sort the cached data")]
#[command(version)]
pub struct Cli {
    /// Endpoints to fetch, appended verbatim to the base URL
    ///
    /// All endpoints are fetched concurrently; the first one is used for the
    /// filter and sort views.
    #[arg(value_name = "ENDPOINT", default_value = "/users")]
    pub endpoints: Vec<String>,

    /// Base URL of the API
    #[arg(long, env = "JSONFETCH_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum number of attempts per endpoint
    #[arg(long, env = "JSONFETCH_RETRIES", default_value_t = DEFAULT_RETRIES)]
    pub retries: u32,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Field the filter view compares
    #[arg(long, default_value = "id")]
    pub filter_field: String,

    /// Keep items whose filter field is strictly below this value
    #[arg(long, value_name = "LIMIT", default_value_t = 5.0)]
    pub below: f64,

    /// Field the sort view orders by
    #[arg(long, value_name = "FIELD", default_value = "name")]
    pub sort_by: String,

    /// Fail immediately when a response body is not valid JSON
    #[arg(long)]
    pub no_retry_on_decode: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments for the demo run
#[derive(Debug, Clone, PartialEq)]
pub struct StartupConfig {
    pub base_url: String,
    pub retry: RetryConfig,
    pub timeout: Option<Duration>,
    /// Endpoints to fetch; never empty
    pub endpoints: Vec<String>,
    pub filter_field: String,
    pub below: f64,
    pub sort_by: String,
    pub verbose: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            retry: RetryConfig::default(),
            timeout: None,
            endpoints: vec!["/users".to_string()],
            filter_field: "id".to_string(),
            below: 5.0,
            sort_by: "name".to_string(),
            verbose: false,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with validated settings
    /// * `Err(CliError)` if the base URL, endpoints or limit are unusable
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let base_url = validate_base_url(&cli.base_url)?;

        if cli.endpoints.is_empty() {
            return Err(CliError::NoEndpoints);
        }

        if !cli.below.is_finite() {
            return Err(CliError::InvalidLimit(cli.below));
        }

        Ok(StartupConfig {
            base_url,
            retry: RetryConfig {
                retries: cli.retries,
                retry_on_decode: !cli.no_retry_on_decode,
            },
            timeout: cli.timeout.map(Duration::from_secs),
            endpoints: cli.endpoints.clone(),
            filter_field: cli.filter_field.clone(),
            below: cli.below,
            sort_by: cli.sort_by.clone(),
            verbose: cli.verbose,
        })
    }

    /// The endpoint the filter and sort views run against
    pub fn primary_endpoint(&self) -> &str {
        &self.endpoints[0]
    }
}

/// Checks that `url` is an http(s) URL with a host and trims trailing slashes
///
/// Endpoints are appended verbatim, so `https://api.test/` + `/users` would
/// otherwise produce a double slash.
pub fn validate_base_url(url: &str) -> Result<String, CliError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .ok_or_else(|| CliError::InvalidBaseUrl(url.to_string()))?;

    if rest.trim_end_matches('/').is_empty() {
        return Err(CliError::InvalidBaseUrl(url.to_string()));
    }

    Ok(url.trim_end_matches('/').to_string())
}
