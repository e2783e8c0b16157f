//! HTTP fetching for viewer documents and page images.
//!
//! # Features
//!
//! - Browser User-Agent on every request
//! - Cookie jar shared across all requests of one book ([`Session`])
//! - Configurable timeouts (30s connect, 5min read by default)
//! - Structured error types carrying the failed URL
//! - No retries: the first failure is returned to the caller

mod client;
mod constants;
mod error;

pub use client::{FetchSettings, HttpFetcher, Session};
pub use constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
pub use error::FetchError;
