//! HTTP client with retry and rate limiting
//!
//! Provides the request executor that handles:
//! - Binding every call to a caller-supplied [`RequestContext`]
//! - Automatic retries with configurable backoff
//! - Rate limiting to stay within the API quota
//! - Header assembly and authentication
//! - Error classification for retry decisions

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::response::{error_details, RawResponse};
use crate::auth::{AuthType, Authenticator, Credentials};
use crate::context::RequestContext;
use crate::error::{is_retryable_status, Error, Result};
use crate::types::{BackoffType, Method, StringMap};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Base URL of the v4 API
pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Base URL for all requests
    pub base_url: String,
    /// Per-attempt transport timeout
    pub timeout: Duration,
    /// Maximum number of retries (0 = single attempt)
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Custom headers sent with every request, overriding defaults
    pub headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            backoff_type: BackoffType::Exponential,
            rate_limit: Some(RateLimiterConfig::default()),
            headers: StringMap::new(),
            user_agent: format!("cloudflare-api/{}", env!("CARGO_PKG_VERSION")),
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
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the per-attempt timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Disable retries: exactly one attempt per request
    pub fn no_retries(mut self) -> Self {
        self.config.max_retries = 0;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a custom header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// Configuration for a single request
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: StringMap,
    /// Request body (JSON)
    pub body: Option<Value>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}

/// HTTP client with retry and rate limiting
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    base_url: Url,
    default_headers: HeaderMap,
    custom_headers: HeaderMap,
    authenticator: Option<Authenticator>,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;

        let base_url = Url::parse(&config.base_url)?;
        let custom_headers = parse_headers(&config.headers)?;

        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            base_url,
            default_headers,
            custom_headers,
            authenticator: None,
            rate_limiter,
        })
    }

    /// Create a client with authentication
    pub fn with_auth(config: HttpClientConfig, credentials: Credentials) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.authenticator = Some(Authenticator::new(credentials));
        Ok(client)
    }

    /// Replace the credentials used from the next request on
    pub fn set_credentials(&mut self, credentials: Credentials) {
        match self.authenticator.as_mut() {
            Some(auth) => auth.set_credentials(credentials),
            None => self.authenticator = Some(Authenticator::new(credentials)),
        }
    }

    /// The active authentication scheme, if any
    pub fn auth_type(&self) -> Option<AuthType> {
        self.authenticator.as_ref().map(Authenticator::auth_type)
    }

    /// Get the client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Issue one request bound to `ctx`
    pub async fn execute(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<RawResponse> {
        let config = RequestConfig {
            body,
            ..RequestConfig::default()
        };
        self.execute_with_config(ctx, method, path, config).await
    }

    /// Issue one request bound to `ctx` with per-request settings
    ///
    /// The rate limiter wait, every attempt, backoff sleeps and the body read
    /// all race against the context. When it finishes first the in-flight
    /// request is dropped and the context's error is returned.
    pub async fn execute_with_config(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<RawResponse> {
        let url = self.build_url(path, &config.query)?;

        if let Some(err) = ctx.err() {
            debug!(%method, %url, "context already done: {err}");
            return Err(err);
        }

        tokio::select! {
            biased;
            err = ctx.done() => {
                warn!(%method, %url, "request abandoned: {err}");
                Err(err)
            }
            result = self.send_with_retries(method, &url, &config) => result,
        }
    }

    /// Issue a request and decode the JSON body
    pub async fn execute_json<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<T> {
        let response = self.execute_with_config(ctx, method, path, config).await?;
        response.json()
    }

    /// Build the header set for a request
    ///
    /// Defaults < client custom headers < request headers < credentials.
    pub fn build_headers(&self, request_headers: &HeaderMap) -> HeaderMap {
        let mut custom = self.custom_headers.clone();
        for (name, value) in request_headers {
            custom.insert(name.clone(), value.clone());
        }

        match &self.authenticator {
            Some(auth) => auth.build_headers(&self.default_headers, &custom),
            None => {
                let mut headers = self.default_headers.clone();
                for (name, value) in &custom {
                    headers.insert(name.clone(), value.clone());
                }
                headers
            }
        }
    }

    async fn send_with_retries(
        &self,
        method: Method,
        url: &Url,
        config: &RequestConfig,
    ) -> Result<RawResponse> {
        let max_retries = config.max_retries.unwrap_or(self.config.max_retries);
        let timeout = config.timeout.unwrap_or(self.config.timeout);
        let body = config.body.as_ref().map(serde_json::to_vec).transpose()?;
        let request_headers = parse_headers(&config.headers)?;

        let mut last_error = None;
        let mut attempt = 0;

        while attempt <= max_retries {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            // Credentials are read per attempt
            let headers = self.build_headers(&request_headers);
            let mut req = self
                .client
                .request(method.into(), url.clone())
                .headers(headers)
                .timeout(timeout);
            if let Some(ref body) = body {
                req = req.body(body.clone());
            }

            debug!(%method, %url, attempt = attempt + 1, "sending request");

            match req.send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        debug!(%method, %url, status = status.as_u16(), "request succeeded");
                        return read_response(response).await;
                    }

                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let delay = extract_retry_after(&response)
                            .unwrap_or_else(|| self.calculate_backoff(attempt));
                        if attempt < max_retries {
                            warn!(
                                "Rate limited (429), attempt {}/{}, waiting {:?}",
                                attempt + 1,
                                max_retries + 1,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(Error::RateLimited {
                            retry_after_seconds: delay.as_secs(),
                        });
                    }

                    if is_retryable_status(status.as_u16()) && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Request failed with {}, attempt {}/{}, retrying in {:?}",
                            status.as_u16(),
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::api(status.as_u16(), Vec::new()));
                        continue;
                    }

                    let body = response.bytes().await.unwrap_or_default();
                    return Err(Error::api(status.as_u16(), error_details(&body)));
                }
                Err(e) => {
                    if e.is_timeout() {
                        let err = Error::Timeout {
                            timeout_ms: timeout.as_millis() as u64,
                        };
                        if attempt < max_retries {
                            let delay = self.calculate_backoff(attempt);
                            warn!(
                                "Request timeout, attempt {}/{}, retrying in {:?}",
                                attempt + 1,
                                max_retries + 1,
                                delay
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                            last_error = Some(err);
                            continue;
                        }
                        return Err(err);
                    }

                    if e.is_connect() && attempt < max_retries {
                        let delay = self.calculate_backoff(attempt);
                        warn!(
                            "Connection error, attempt {}/{}, retrying in {:?}",
                            attempt + 1,
                            max_retries + 1,
                            delay
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                        last_error = Some(Error::Http(e));
                        continue;
                    }

                    return Err(Error::Http(e));
                }
            }
        }

        Err(last_error.unwrap_or(Error::MaxRetriesExceeded { max_retries }))
    }

    /// Build full URL from path and query
    fn build_url(&self, path: &str, query: &[(String, String)]) -> Result<Url> {
        let mut url = if path.starts_with("http://") || path.starts_with("https://") {
            Url::parse(path)?
        } else {
            let base = self.base_url.as_str().trim_end_matches('/');
            let path = path.trim_start_matches('/');
            Url::parse(&format!("{base}/{path}"))?
        };

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self
                .config
                .initial_backoff
                .saturating_mul(attempt.saturating_add(1)),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff.saturating_mul(factor)
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("auth_type", &self.auth_type())
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Parse string headers into a header map
fn parse_headers(headers: &StringMap) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| Error::invalid_header(key, e.to_string()))?;
        let value =
            HeaderValue::from_str(value).map_err(|e| Error::invalid_header(key, e.to_string()))?;
        map.insert(name, value);
    }
    Ok(map)
}

async fn read_response(response: Response) -> Result<RawResponse> {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let body = response.bytes().await.map_err(Error::Http)?;
    Ok(RawResponse {
        status,
        headers,
        body,
    })
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Option<Duration> {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .map(Duration::from_secs)
}
