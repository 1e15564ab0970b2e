use reqwest::Url;
use std::time::Duration;

use crate::error::{Error, Result};

/// Production API root.
pub const DEFAULT_BASE_URL: &str = "https://tspay.uz/api/v1";

/// Number of attempts made when the backend keeps answering 429.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Wait between rate-limited attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(3);

/// Settings of a [`TsPayClient`](crate::TsPayClient). Fixed once the client is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the API root. A trailing slash is dropped.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the attempt budget. Values below 1 are raised to 1.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Joins `segments` onto the base URL, each percent-encoded as exactly one
    /// path segment, and adds the trailing slash the API expects.
    ///
    /// A base URL that does not parse is a local `InvalidRequest`, reported
    /// before any I/O.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            Error::invalid_request(format!("Invalid base URL {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                Error::invalid_request(format!("Base URL {} cannot carry a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }
}
