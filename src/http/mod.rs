//! HTTP client module
//!
//! Provides the request executor used by every API call.
//!
//! # Features
//!
//! - **Context binding**: Each call races a [`crate::RequestContext`] and
//!   returns promptly when it expires or is cancelled
//! - **Automatic Retries**: Configurable retry logic with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Authentication**: Credential headers from the auth module

mod client;
mod rate_limit;
mod response;

pub use client::{
    HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig, DEFAULT_BASE_URL,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::RawResponse;
