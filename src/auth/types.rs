//! Credential types
//!
//! Each credential scheme is a variant of [`Credentials`] holding exactly
//! the values that scheme needs. Values are validated when the variant is
//! constructed, so building request headers later cannot fail.

use crate::error::{Error, Result};
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

/// The credential scheme used to authenticate requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthType {
    /// Global API key plus account email
    #[default]
    KeyEmail,
    /// Origin CA user service key
    UserServiceKey,
    /// Scoped API token sent as a bearer token
    ApiToken,
}

impl std::fmt::Display for AuthType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AuthType::KeyEmail => "key_email",
            AuthType::UserServiceKey => "user_service_key",
            AuthType::ApiToken => "api_token",
        };
        f.write_str(name)
    }
}

/// A validated header value carrying credential material
///
/// Secret values are flagged sensitive so they are redacted from `Debug`
/// output and excluded from HTTP/2 header compression tables.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialValue(HeaderValue);

impl CredentialValue {
    /// Validate a secret credential value
    pub fn secret(field: &str, value: impl Into<String>) -> Result<Self> {
        let mut header = Self::parse(field, value.into())?;
        header.set_sensitive(true);
        Ok(Self(header))
    }

    /// Validate a non-secret credential value (e.g. an account email)
    pub fn public(field: &str, value: impl Into<String>) -> Result<Self> {
        Self::parse(field, value.into()).map(Self)
    }

    fn parse(field: &str, value: String) -> Result<HeaderValue> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::missing_credential(field));
        }
        HeaderValue::from_str(value)
            .map_err(|e| Error::invalid_header(field, format!("invalid credential value: {e}")))
    }

    /// Access the header value
    pub fn header_value(&self) -> &HeaderValue {
        &self.0
    }

    /// Whether this value is redacted from debug output
    pub fn is_sensitive(&self) -> bool {
        self.0.is_sensitive()
    }
}

impl std::fmt::Debug for CredentialValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_sensitive() {
            f.write_str("CredentialValue(<redacted>)")
        } else {
            f.debug_tuple("CredentialValue").field(&self.0).finish()
        }
    }
}

/// Credentials for exactly one authentication scheme
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Global API key (`X-Auth-Key`) and account email (`X-Auth-Email`)
    KeyEmail {
        /// The global API key
        key: CredentialValue,
        /// The account email
        email: CredentialValue,
    },

    /// User service key (`X-Auth-User-Service-Key`)
    UserServiceKey {
        /// The user service key
        key: CredentialValue,
    },

    /// API token (`Authorization: Bearer <token>`)
    ApiToken {
        /// The full `Bearer <token>` header value
        authorization: CredentialValue,
    },
}

impl Credentials {
    /// Global API key and email credentials
    pub fn key_email(key: impl Into<String>, email: impl Into<String>) -> Result<Self> {
        Ok(Self::KeyEmail {
            key: CredentialValue::secret("api_key", key)?,
            email: CredentialValue::public("api_email", email)?,
        })
    }

    /// User service key credentials
    pub fn user_service_key(key: impl Into<String>) -> Result<Self> {
        Ok(Self::UserServiceKey {
            key: CredentialValue::secret("user_service_key", key)?,
        })
    }

    /// API token credentials
    pub fn api_token(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        let token = token.trim();
        if token.is_empty() {
            return Err(Error::missing_credential("api_token"));
        }
        Ok(Self::ApiToken {
            authorization: CredentialValue::secret("api_token", format!("Bearer {token}"))?,
        })
    }

    /// The scheme these credentials belong to
    pub fn auth_type(&self) -> AuthType {
        match self {
            Self::KeyEmail { .. } => AuthType::KeyEmail,
            Self::UserServiceKey { .. } => AuthType::UserServiceKey,
            Self::ApiToken { .. } => AuthType::ApiToken,
        }
    }
}
