//! jsonfetch - fetch JSON endpoints with retries and cache the results
//!
//! Runs a short demo against the configured API: fetch every endpoint, show
//! the primary dataset, a filtered view, a sorted view, and finally the
//! same dataset again, which is served from the cache.

use std::process;

use clap::Parser;
use serde_json::Value;

use jsonfetch::cli::{Cli, StartupConfig};
use jsonfetch::data::{views, DataError, DataManager, ReqwestTransport, TransportError};
use jsonfetch::logging;

/// Builds the data manager described by `config`
fn build_manager(config: &StartupConfig) -> Result<DataManager, TransportError> {
    let transport = match config.timeout {
        Some(timeout) => ReqwestTransport::with_timeout(timeout)?,
        None => ReqwestTransport::new(),
    };

    Ok(DataManager::builder(config.base_url.clone())
        .retry_config(config.retry)
        .transport(transport)
        .build())
}

/// Prints a labelled JSON value
fn print_section(label: &str, value: &Value) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    println!("{}:\n{}\n", label, rendered);
}

/// Runs the demo sequence, stopping at the first terminal failure
async fn run(manager: &DataManager, config: &StartupConfig) -> Result<(), DataError> {
    // Fetch all endpoints concurrently; each gets its own retry budget
    let results =
        futures::future::join_all(config.endpoints.iter().map(|e| manager.get_data(e))).await;
    for result in results {
        result?;
    }

    let endpoint = config.primary_endpoint();

    let data = manager.get_data(endpoint).await?;
    print_section(&format!("Data for {}", endpoint), &data);

    let filtered = manager
        .filter_data(endpoint, views::field_below(config.filter_field.as_str(), config.below))
        .await?;
    print_section(
        &format!("Items with {} < {}", config.filter_field, config.below),
        &Value::Array(filtered),
    );

    let sorted = manager
        .sort_data(endpoint, views::by_field(config.sort_by.as_str()))
        .await?;
    print_section(
        &format!("Items sorted by {}", config.sort_by),
        &Value::Array(sorted),
    );

    let cached = manager.get_data(endpoint).await?;
    print_section("Cached data", &cached);

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    logging::init(config.verbose);
    tracing::debug!(
        base_url = %config.base_url,
        retries = config.retry.retries,
        endpoints = ?config.endpoints,
        "Starting"
    );

    let manager = build_manager(&config)?;

    if let Err(e) = run(&manager, &config).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    Ok(())
}
