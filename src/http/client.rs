//! Upstream HTTP client
//!
//! GET-only JSON client for the Hacker News API. Every attempt waits on the
//! shared rate limiter first. Attempts are classified as success, retryable
//! (429, 5xx, timeouts, connection errors) or fatal, and retryable ones are
//! repeated with backoff until `max_retries` is spent.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use crate::error::{Error, Result};
use crate::types::BackoffType;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Wait used for a 429 without a usable `Retry-After` header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

const USER_AGENT: &str = concat!("storyfeed/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// API root prepended to relative paths
    pub base_url: Option<String>,
    /// Per-attempt timeout
    pub timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Upper bound for any retry delay, `Retry-After` included
    pub max_backoff: Duration,
    /// How the delay grows between retries
    pub backoff_type: BackoffType,
    /// Shared request budget; `None` disables limiting
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

// ============================================================================
// Client
// ============================================================================

/// Result of a single request attempt
enum Attempt {
    Success(Response),
    Retry { error: Error, delay: Duration },
    Fatal(Error),
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// GET `path`, retrying transient failures
    ///
    /// When retries run out the last attempt's error is returned.
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = self.build_url(path);
        let mut retries = 0;

        loop {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait().await;
            }

            match self.attempt(&url, retries).await {
                Attempt::Success(response) => {
                    debug!(%url, retries, "GET succeeded");
                    return Ok(response);
                }
                Attempt::Fatal(error) => return Err(error),
                Attempt::Retry { error, .. } if retries >= self.config.max_retries => {
                    return Err(error);
                }
                Attempt::Retry { error, delay } => {
                    retries += 1;
                    warn!(
                        %url,
                        retry = retries,
                        max_retries = self.config.max_retries,
                        ?delay,
                        "Retrying after: {error}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// GET `path` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.get(path).await?;
        Ok(response.json().await?)
    }

    /// Resolve `path` against the base URL; absolute URLs pass through
    pub fn build_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }

        match &self.config.base_url {
            Some(base) => format!(
                "{}/{}",
                base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => path.to_string(),
        }
    }

    /// Delay before retry number `retries + 1`
    pub fn backoff(&self, retries: u32) -> Duration {
        let initial = self.config.initial_backoff;
        let delay = match self.config.backoff_type {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(retries.saturating_add(1)),
            BackoffType::Exponential => initial.saturating_mul(2u32.saturating_pow(retries)),
        };
        delay.min(self.config.max_backoff)
    }

    async fn attempt(&self, url: &str, retries: u32) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => {
                return Attempt::Retry {
                    error: Error::Timeout {
                        timeout_ms: self.config.timeout.as_millis() as u64,
                    },
                    delay: self.backoff(retries),
                };
            }
            Err(e) if e.is_connect() => {
                return Attempt::Retry {
                    error: Error::Http(e),
                    delay: self.backoff(retries),
                };
            }
            Err(e) => return Attempt::Fatal(Error::Http(e)),
        };

        let status = response.status();
        if status.is_success() {
            return Attempt::Success(response);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let delay = retry_after(&response).min(self.config.max_backoff);
            return Attempt::Retry {
                error: Error::RateLimited {
                    retry_after_seconds: delay.as_secs(),
                },
                delay,
            };
        }

        let error = Error::http_status(status.as_u16(), response.text().await.unwrap_or_default());
        if error.is_retryable() {
            Attempt::Retry {
                error,
                delay: self.backoff(retries),
            }
        } else {
            Attempt::Fatal(error)
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("rate_limited", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// `Retry-After` in whole seconds
fn retry_after(response: &Response) -> Duration {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map_or(DEFAULT_RETRY_AFTER, Duration::from_secs)
}
