//! Session-scoped HTTP fetcher for viewer documents and page images.
//!
//! This module provides the `HttpFetcher` struct which performs plain GET
//! requests with a browser identity and a cookie jar shared across every
//! request of one book.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use reqwest::cookie::Jar;
use tracing::{debug, instrument};

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use crate::user_agent::BROWSER_USER_AGENT;

/// Cookie-bearing state for one book's retrieval.
///
/// The viewer only grants page access after the cover page has been loaded
/// in the same session, so a session must be reused for every request of a
/// book and never shared between books retrieved concurrently.
#[derive(Debug, Clone, Default)]
pub struct Session {
    jar: Arc<Jar>,
}

impl Session {
    /// Creates an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying cookie jar.
    #[must_use]
    pub fn cookie_jar(&self) -> Arc<Jar> {
        Arc::clone(&self.jar)
    }
}

/// Timeout configuration for [`HttpFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchSettings {
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds.
    pub read_timeout_secs: u64,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: CONNECT_TIMEOUT_SECS,
            read_timeout_secs: READ_TIMEOUT_SECS,
        }
    }
}

/// HTTP fetcher bound to a single [`Session`].
///
/// Requests are sent one at a time by the caller; nothing here retries.
///
/// # Example
///
/// ```no_run
/// use pagegrab_core::fetch::{FetchSettings, HttpFetcher, Session};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(Session::new(), FetchSettings::default())?;
/// let html = fetcher.fetch_text("https://books.google.com/books?id=abc").await?;
/// println!("{} bytes", html.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher that stores and replays cookies through `session`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] if the HTTP client cannot be built.
    #[instrument(level = "debug", skip(session))]
    pub fn new(session: Session, settings: FetchSettings) -> Result<Self, FetchError> {
        let client = build_client(session.cookie_jar(), settings)
            .map_err(|source| FetchError::Client { source })?;
        Ok(Self { client })
    }

    /// Fetches `url` and returns the body decoded as text.
    ///
    /// The charset comes from the response `Content-Type`, defaulting to UTF-8.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout, or a
    /// non-success status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.send(url).await?;
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), "received text body");
        Ok(body)
    }

    /// Fetches `url` and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] on transport failure, timeout, or a
    /// non-success status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_bytes(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self.send(url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        debug!(bytes = body.len(), "received binary body");
        Ok(body)
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response, FetchError> {
        debug!("sending GET request");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }
        debug!(status = status.as_u16(), "response received");
        Ok(response)
    }
}

fn build_client(jar: Arc<Jar>, settings: FetchSettings) -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
        .timeout(Duration::from_secs(settings.read_timeout_secs))
        .gzip(true)
        .user_agent(BROWSER_USER_AGENT)
        .cookie_provider(jar)
        .build()
}
