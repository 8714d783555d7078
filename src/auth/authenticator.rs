//! Authenticator implementation
//!
//! Builds the full header set for an outgoing request: defaults first,
//! then caller-supplied custom headers, then the credential headers of the
//! active scheme.

use super::types::{AuthType, Credentials};
use reqwest::header::{HeaderMap, HeaderName, AUTHORIZATION};

/// `X-Auth-Email` header
pub const X_AUTH_EMAIL: HeaderName = HeaderName::from_static("x-auth-email");
/// `X-Auth-Key` header
pub const X_AUTH_KEY: HeaderName = HeaderName::from_static("x-auth-key");
/// `X-Auth-User-Service-Key` header
pub const X_AUTH_USER_SERVICE_KEY: HeaderName =
    HeaderName::from_static("x-auth-user-service-key");

/// Every header name owned by some credential scheme
pub const CREDENTIAL_HEADERS: [HeaderName; 4] = [
    X_AUTH_EMAIL,
    X_AUTH_KEY,
    X_AUTH_USER_SERVICE_KEY,
    AUTHORIZATION,
];

/// Authenticator applies the active credentials to outgoing requests
///
/// The credentials are read every time headers are built, so replacing
/// them with [`Authenticator::set_credentials`] takes effect on the next
/// request.
#[derive(Debug, Clone)]
pub struct Authenticator {
    credentials: Credentials,
}

impl Authenticator {
    /// Create a new authenticator with the given credentials
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// Replace the active credentials
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    /// Get the active credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Get the active scheme
    pub fn auth_type(&self) -> AuthType {
        self.credentials.auth_type()
    }

    /// Merge default and custom headers, then apply credentials
    ///
    /// Custom headers replace defaults of the same name. Credential header
    /// names are stripped from both before the active scheme's headers are
    /// inserted.
    pub fn build_headers(&self, defaults: &HeaderMap, custom: &HeaderMap) -> HeaderMap {
        let mut headers = defaults.clone();
        for name in custom.keys() {
            headers.remove(name);
            for value in custom.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }
        self.apply(&mut headers);
        headers
    }

    /// Apply credential headers in place
    pub fn apply(&self, headers: &mut HeaderMap) {
        for name in &CREDENTIAL_HEADERS {
            headers.remove(name);
        }

        match &self.credentials {
            Credentials::KeyEmail { key, email } => {
                headers.insert(X_AUTH_EMAIL, email.header_value().clone());
                headers.insert(X_AUTH_KEY, key.header_value().clone());
            }
            Credentials::UserServiceKey { key } => {
                headers.insert(X_AUTH_USER_SERVICE_KEY, key.header_value().clone());
            }
            Credentials::ApiToken { authorization } => {
                headers.insert(AUTHORIZATION, authorization.header_value().clone());
            }
        }
    }
}
