/// HTTP client for the APOD endpoint
///
/// Wraps the single GET planetary/apod operation behind an async trait
/// so the repository can be driven by a stub in tests. Transport
/// failures map onto a small typed taxonomy the UI can message on.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::response::ApodResponse;

/// Production endpoint of the archive
pub const BASE_URL: &str = "https://api.nasa.gov";

/// Transport-level timeout for one request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Failures of one remote lookup
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The host could not be reached at all
    #[error("no internet connection")]
    NoConnectivity,
    /// The request ran past the transport timeout
    #[error("request timed out")]
    Timeout,
    /// The service answered with a non-success status
    #[error("service returned status {0}")]
    Remote(u16),
    /// Any other transport or decoding failure
    #[error("network error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::NoConnectivity
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

/// Remote service returning the picture metadata for one date.
/// Stateless and idempotent; safe to call concurrently from any
/// background context.
#[async_trait]
pub trait ApodService: Send + Sync {
    /// Fetch the archive entry for a canonical YYYY-MM-DD date
    async fn fetch(&self, api_key: &str, date: &str) -> Result<ApodResponse, ApiError>;
}

/// reqwest-backed client for the real archive
#[derive(Debug, Clone)]
pub struct ApodClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApodClient {
    /// Create a client against the production endpoint
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Create a client against a different endpoint (tests, mirrors)
    pub fn with_base_url(base_url: &str) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("static client configuration is valid");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ApodClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ApodService for ApodClient {
    async fn fetch(&self, api_key: &str, date: &str) -> Result<ApodResponse, ApiError> {
        debug!(date, "requesting picture of the day");

        let response = self
            .client
            .get(format!("{}/planetary/apod", self.base_url))
            .query(&[("api_key", api_key), ("date", date)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, date, "archive returned an error status");
            return Err(ApiError::Remote(status.as_u16()));
        }

        let entry: ApodResponse = response.json().await?;
        Ok(entry)
    }
}
