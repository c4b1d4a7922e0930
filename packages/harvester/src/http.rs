//! HTTP transport for release discovery and document downloads.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, FROM};

use crate::config::{HarvesterConfig, MAX_RETRIES_LIMIT};
use crate::error::{HarvesterError, Result};

/// User agent string identifying this harvester.
pub const USER_AGENT: &str = concat!("h41-harvester/", env!("CARGO_PKG_VERSION"));

/// Base delay for exponential backoff (milliseconds).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Longest single wait between attempts (milliseconds).
const RETRY_MAX_DELAY_MS: u64 = 8_000;

/// Wait before retry number `attempt` (1-based): 500ms, 1s, 2s, ... capped.
fn backoff_delay(attempt: u32) -> Duration {
    let delay = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .and_then(|factor| RETRY_BASE_DELAY_MS.checked_mul(factor))
        .unwrap_or(RETRY_MAX_DELAY_MS)
        .min(RETRY_MAX_DELAY_MS);
    Duration::from_millis(delay)
}

/// Fetches markup by URL.
///
/// The pipeline only touches the network through this trait, so tests can
/// swap in canned responses.
pub trait Transport: Send + Sync {
    /// Body of a successful (2xx, non-empty) response.
    fn get_text(&self, url: &str) -> Result<String>;
}

/// Blocking `reqwest` transport with timeout and retries.
pub struct HttpTransport {
    client: Client,
    max_retries: u32,
}

impl HttpTransport {
    /// Create a transport from the harvester configuration.
    ///
    /// Requests carry the harvester's `User-Agent`, plus a `From` header
    /// when a contact address is configured.
    pub fn new(config: &HarvesterConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(contact) = &config.contact {
            let value = HeaderValue::from_str(contact)
                .map_err(|e| HarvesterError::Config(format!("invalid contact header: {e}")))?;
            headers.insert(FROM, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            max_retries: config.max_retries.clamp(1, MAX_RETRIES_LIMIT),
        })
    }
}

impl Transport for HttpTransport {
    /// Download a URL with retry logic.
    ///
    /// Connection errors, timeouts and 5xx responses are retried with
    /// exponential backoff. Other non-2xx statuses and empty bodies fail
    /// immediately.
    fn get_text(&self, url: &str) -> Result<String> {
        let mut last_error: Option<String> = None;

        for attempt in 0..self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(attempt);
                tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "Retrying after delay");
                thread::sleep(delay);
            }

            match self.client.get(url).send() {
                Ok(response) => {
                    let status = response.status();

                    if status.is_server_error() {
                        tracing::warn!(
                            %url,
                            status = %status,
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            "Server error, will retry"
                        );
                        last_error = Some(format!("Server error: {status}"));
                        continue;
                    }

                    // 4xx will not succeed on retry
                    if !status.is_success() {
                        return Err(HarvesterError::Fetch {
                            url: url.to_string(),
                            reason: format!("HTTP status {status}"),
                        });
                    }

                    let body = response.text()?;
                    if body.trim().is_empty() {
                        return Err(HarvesterError::Fetch {
                            url: url.to_string(),
                            reason: "empty response body".to_string(),
                        });
                    }
                    tracing::debug!(%url, bytes = body.len(), "Downloaded");
                    return Ok(body);
                }
                Err(e) => {
                    if e.is_connect() || e.is_timeout() {
                        tracing::warn!(
                            %url,
                            error = %e,
                            attempt = attempt + 1,
                            max_retries = self.max_retries,
                            "Connection error, will retry"
                        );
                        last_error = Some(e.to_string());
                        continue;
                    }
                    return Err(HarvesterError::Http(e));
                }
            }
        }

        Err(HarvesterError::RetriesExhausted {
            attempts: self.max_retries,
            message: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }
}
