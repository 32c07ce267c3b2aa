//! jsonfetch library
//!
//! A retrying, memoizing fetch helper for JSON APIs. The binary in `main.rs`
//! is a thin demo on top of `data::DataManager`; the modules are public so
//! integration tests can drive them directly.

pub mod cache;
pub mod cli;
pub mod data;
pub mod logging;

pub use data::{DataError, DataManager, FetchError};
