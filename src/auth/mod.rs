//! Authentication module
//!
//! Supports: API Key + Email, User Service Key, API Token
//!
//! Exactly one scheme is active at a time. Each scheme owns a disjoint set
//! of header names and the `Authenticator` guarantees no header belonging
//! to another scheme leaks into a request.

mod authenticator;
mod types;

pub use authenticator::{
    Authenticator, CREDENTIAL_HEADERS, X_AUTH_EMAIL, X_AUTH_KEY, X_AUTH_USER_SERVICE_KEY,
};
pub use types::{AuthType, CredentialValue, Credentials};
