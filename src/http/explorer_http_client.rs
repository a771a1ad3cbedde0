//! reqwest-backed implementation of [`ExplorerApi`].
//!
//! # Example
//!
//! ```rust,no_run
//! use url::Url;
//! use nrlxplore::http::{ExplorerApi, ExplorerHttpClient};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let client = ExplorerHttpClient::new(Url::parse("http://localhost:3000/api/")?)?;
//!
//! let envelope = client.get("/address/txs/AK2nJJpJr6o664CWJKi1QRXjqeic2zRp8y", &[("offset", "0".into())]).await?;
//! println!("status {}", envelope.status);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use url::Url;

use super::api::{ExplorerApi, QueryParams};
use super::error::HttpError;
use super::http_client::HttpClient;
use super::types::Envelope;

/// HTTP client for the explorer backend.
///
/// Transient failures are retried with exponential backoff and the latency
/// of the most recent request is tracked. Safe to share across tasks.
pub struct ExplorerHttpClient {
    http_client: HttpClient,
}

impl ExplorerHttpClient {
    /// Creates a client with the default 30 second timeout and 3 retries.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized (e.g.,
    /// TLS backend initialization failure).
    pub fn new(base_url: Url) -> Result<Self, anyhow::Error> {
        let http_client = HttpClient::new(base_url)?;
        Ok(Self { http_client })
    }

    /// Creates a client with custom retry and timeout settings.
    ///
    /// * `max_retries` - Retry attempts for transient failures, 0 disables retries.
    /// * `timeout` - Maximum duration to wait for a response.
    pub fn with_config(base_url: Url, max_retries: u32, timeout: Duration) -> Result<Self, anyhow::Error> {
        let http_client = HttpClient::with_config(base_url, max_retries, timeout)?;
        Ok(Self { http_client })
    }

    /// Returns the configured API base URL as a string.
    pub fn get_address(&self) -> String {
        self.http_client.base_url().to_string()
    }

    /// Returns the round-trip time of the most recent request, if any.
    pub async fn get_last_request_latency(&self) -> Option<Duration> {
        self.http_client.get_latency().await
    }
}

#[async_trait]
impl ExplorerApi for ExplorerHttpClient {
    async fn get(&self, path: &str, params: QueryParams<'_>) -> Result<Envelope, HttpError> {
        debug!(path = path; "HTTP: Requesting explorer resource");

        match self.http_client.get_json::<Envelope>(path, params).await {
            Ok(envelope) => {
                debug!(path = path, status = envelope.status; "HTTP: Explorer responded");
                Ok(envelope)
            },
            Err(e) => {
                warn!(path = path, error:% = e; "HTTP: Explorer request failed");
                Err(e)
            },
        }
    }
}
