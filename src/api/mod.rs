//! API client
//!
//! [`Api`] is the handle callers hold. It owns the request executor and the
//! active credentials, decodes the standard response envelope, and walks
//! paginated listings.
//!
//! ```rust,ignore
//! use cloudflare_api::{Api, HttpClientConfig, RequestContext};
//!
//! let api = Api::with_api_token("my-token", HttpClientConfig::default())?;
//! let ctx = RequestContext::background().with_timeout(Duration::from_secs(10));
//! let user = api.user_details(&ctx).await?;
//! ```

mod envelope;
mod user;

pub use envelope::{Envelope, ResponseMessage};
pub use user::User;

use crate::auth::{AuthType, Credentials};
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig, RequestConfig};
use crate::pagination::{is_consistent, Listing, Page, PaginationOptions};
use crate::types::Method;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Client for the v4 REST API
#[derive(Debug)]
pub struct Api {
    http: HttpClient,
}

impl Api {
    /// Create a client authenticating with a global API key and account email
    pub fn new(
        key: impl Into<String>,
        email: impl Into<String>,
        config: HttpClientConfig,
    ) -> Result<Self> {
        Self::with_credentials(Credentials::key_email(key, email)?, config)
    }

    /// Create a client authenticating with a user service key
    pub fn with_user_service_key(key: impl Into<String>, config: HttpClientConfig) -> Result<Self> {
        Self::with_credentials(Credentials::user_service_key(key)?, config)
    }

    /// Create a client authenticating with an API token
    pub fn with_api_token(token: impl Into<String>, config: HttpClientConfig) -> Result<Self> {
        Self::with_credentials(Credentials::api_token(token)?, config)
    }

    /// Create a client from already validated credentials
    pub fn with_credentials(credentials: Credentials, config: HttpClientConfig) -> Result<Self> {
        let http = HttpClient::with_auth(config, credentials)?;
        Ok(Self { http })
    }

    /// Create a client from a loaded profile
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Self::with_credentials(config.credentials()?, config.http_config())
    }

    /// Replace the credentials used from the next request on
    ///
    /// Taking `&mut self` means no request can be in flight on this handle
    /// while the scheme changes.
    pub fn set_credentials(&mut self, credentials: Credentials) {
        debug!(auth_type = %credentials.auth_type(), "switching credentials");
        self.http.set_credentials(credentials);
    }

    /// The active authentication scheme
    pub fn auth_type(&self) -> AuthType {
        // Every constructor installs credentials
        self.http.auth_type().unwrap_or_default()
    }

    /// The underlying request executor
    pub fn http(&self) -> &HttpClient {
        &self.http
    }

    /// Issue a request and return the raw response body
    pub async fn request(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Bytes> {
        let response = self.http.execute(ctx, method, path, body).await?;
        Ok(response.body)
    }

    /// Issue a request and decode the response envelope
    ///
    /// An envelope with `success: false` becomes [`crate::Error::Api`].
    pub async fn request_envelope<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        method: Method,
        path: &str,
        config: RequestConfig,
    ) -> Result<Envelope<T>> {
        let response = self
            .http
            .execute_with_config(ctx, method, path, config)
            .await?;
        let envelope: Envelope<T> = response.json()?;
        envelope.into_success(response.status)
    }

    /// Fetch one page of a list endpoint
    ///
    /// The returned page is flagged inconsistent when its `result_info`
    /// does not match the request or the items returned.
    pub async fn list_page<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        options: PaginationOptions,
    ) -> Result<Page<T>> {
        let mut config = RequestConfig::new();
        for (key, value) in options.to_query() {
            config = config.query(key, value);
        }

        let envelope = self
            .request_envelope::<Vec<T>>(ctx, Method::GET, path, config)
            .await?;
        let result_info = envelope.result_info.unwrap_or_default();
        let items = envelope.result.unwrap_or_default();

        let count = u32::try_from(items.len()).unwrap_or(u32::MAX);
        let consistent = is_consistent(options.per_page, options.page, count, &result_info);
        if !consistent {
            warn!(
                path,
                page = options.page,
                per_page = options.per_page,
                count,
                ?result_info,
                "inconsistent pagination info"
            );
        }

        Ok(Page {
            items,
            result_info,
            consistent,
        })
    }

    /// Fetch every page of a list endpoint
    ///
    /// Stops after the last page, or at the first inconsistent page, in which
    /// case the listing is flagged inconsistent and holds the items gathered
    /// so far.
    pub async fn list_all<T: DeserializeOwned>(
        &self,
        ctx: &RequestContext,
        path: &str,
        per_page: u32,
    ) -> Result<Listing<T>> {
        let mut listing = Listing::default();
        let mut options = PaginationOptions::new(1, per_page);

        loop {
            let page = self.list_page::<T>(ctx, path, options).await?;
            listing.pages_fetched += 1;
            listing.items.extend(page.items);

            if !page.consistent {
                listing.consistent = false;
                break;
            }
            if page.result_info.is_last_page() {
                break;
            }
            options = options.next();
        }

        debug!(
            path,
            pages = listing.pages_fetched,
            items = listing.items.len(),
            "listing complete"
        );
        Ok(listing)
    }
}
