//! HTTP client module
//!
//! Upstream HTTP access with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Automatic Retries**: Transient failures (429, 5xx, timeouts) are retried
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Backoff Strategies**: Constant, linear, and exponential backoff

mod client;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
