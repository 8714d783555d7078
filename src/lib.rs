//! # cloudflare-api
//!
//! A typed, async client for the Cloudflare v4 REST API.
//!
//! ## Features
//!
//! - **Three auth schemes**: global API key + email, user service key, API token
//! - **Context-bound requests**: every call takes a [`RequestContext`] carrying a
//!   deadline and cancellation signal
//! - **Retry and rate limiting**: exponential backoff, `Retry-After`, token bucket
//! - **Pagination checks**: `result_info` is validated on every listed page
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use cloudflare_api::{Api, HttpClientConfig, RequestContext, Result};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let api = Api::with_api_token("my-token", HttpClientConfig::default())?;
//!     let ctx = RequestContext::background().with_timeout(Duration::from_secs(10));
//!
//!     let user = api.user_details(&ctx).await?;
//!     println!("{}", user.email);
//!
//!     let zones = api.list_all::<serde_json::Value>(&ctx, "/zones", 50).await?;
//!     if !zones.consistent {
//!         eprintln!("zone listing may be incomplete");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                          Api                             │
//! │  user_details()   request()   list_page()   list_all()   │
//! └──────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────┬───────────────┴────┬────────────────────────┐
//! │    Auth     │       HTTP         │      Pagination        │
//! ├─────────────┼────────────────────┼────────────────────────┤
//! │ Key + Email │ Context deadline   │ ResultInfo             │
//! │ Service Key │ Retry / Backoff    │ Consistency check      │
//! │ API Token   │ Rate Limit         │                        │
//! └─────────────┴────────────────────┴────────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Credential schemes and header selection
pub mod auth;

/// Request deadlines and cancellation
pub mod context;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination metadata and validation
pub mod pagination;

/// Typed API client
pub mod api;

/// Client profile configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{ApiErrorDetail, Error, Result};
pub use types::*;

pub use api::{Api, Envelope, User};
pub use auth::{AuthType, Credentials};
pub use config::ClientConfig;
pub use context::{CancelHandle, RequestContext};
pub use http::{HttpClientConfig, RateLimiterConfig, RequestConfig};
pub use pagination::{is_consistent, Listing, Page, PaginationOptions, ResultInfo};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
