//! Client profile configuration
//!
//! A [`ClientConfig`] is usually loaded from YAML and/or the environment:
//!
//! ```yaml
//! base_url: https://api.cloudflare.com/client/v4
//! timeout_secs: 30
//! retry:
//!   max_retries: 3
//!   min_delay_ms: 1000
//!   max_delay_ms: 30000
//! rate_limit:
//!   requests_per_second: 4
//!   burst_size: 1
//! headers:
//!   X-Custom: value
//! credentials:
//!   api_token: your-api-token
//! ```
//!
//! Values are used literally. To keep secrets out of the file, leave
//! `credentials` empty and set `CLOUDFLARE_API_TOKEN` (or the key, email or
//! service key variables) instead; environment variables take precedence
//! over file values.

use crate::auth::{AuthType, Credentials};
use crate::error::{Error, Result};
use crate::http::{HttpClientConfig, RateLimiterConfig, DEFAULT_BASE_URL};
use crate::types::{BackoffType, OptionStringExt, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// API token environment variable
pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
/// Global API key environment variable
pub const ENV_API_KEY: &str = "CLOUDFLARE_API_KEY";
/// Account email environment variable
pub const ENV_API_EMAIL: &str = "CLOUDFLARE_API_EMAIL";
/// User service key environment variable
pub const ENV_API_USER_SERVICE_KEY: &str = "CLOUDFLARE_API_USER_SERVICE_KEY";
/// Base URL environment variable
pub const ENV_BASE_URL: &str = "CLOUDFLARE_BASE_URL";

// ============================================================================
// Top-Level Client Config
// ============================================================================

/// Complete client profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL for API requests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User agent override
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry policy
    #[serde(default)]
    pub retry: RetryConfig,

    /// Rate limit (null disables)
    #[serde(default = "default_rate_limit")]
    pub rate_limit: Option<RateLimiterConfig>,

    /// Custom headers sent with every request
    #[serde(default)]
    pub headers: StringMap,

    /// Credentials
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_rate_limit() -> Option<RateLimiterConfig> {
    Some(RateLimiterConfig::default())
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: None,
            timeout_secs: default_timeout_secs(),
            retry: RetryConfig::default(),
            rate_limit: default_rate_limit(),
            headers: StringMap::new(),
            credentials: CredentialsConfig::default(),
        }
    }
}

// ============================================================================
// Retry
// ============================================================================

/// Retry policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,

    /// Upper bound on any retry delay
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff growth between retries
    #[serde(default)]
    pub backoff: BackoffType,
}

fn default_max_retries() -> u32 {
    3
}

fn default_min_delay_ms() -> u64 {
    1_000
}

fn default_max_delay_ms() -> u64 {
    30_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff: BackoffType::default(),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Raw credential values as written in a profile
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Explicit scheme; inferred from the values present when omitted
    #[serde(default)]
    pub auth_type: Option<AuthType>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_email: Option<String>,
    #[serde(default)]
    pub user_service_key: Option<String>,
    #[serde(default)]
    pub api_token: Option<String>,
}

impl CredentialsConfig {
    /// Resolve to exactly one credential scheme
    pub fn resolve(&self) -> Result<Credentials> {
        let auth_type = match self.auth_type {
            Some(auth_type) => auth_type,
            None => self.infer_auth_type()?,
        };

        match auth_type {
            AuthType::KeyEmail => Credentials::key_email(
                self.api_key.clone().unwrap_or_default(),
                self.api_email.clone().unwrap_or_default(),
            ),
            AuthType::UserServiceKey => {
                Credentials::user_service_key(self.user_service_key.clone().unwrap_or_default())
            }
            AuthType::ApiToken => Credentials::api_token(self.api_token.clone().unwrap_or_default()),
        }
    }

    fn infer_auth_type(&self) -> Result<AuthType> {
        let key = self.api_key.clone().none_if_empty();
        let email = self.api_email.clone().none_if_empty();
        let service_key = self.user_service_key.clone().none_if_empty();
        let token = self.api_token.clone().none_if_empty();

        let mut present = Vec::new();
        if key.is_some() || email.is_some() {
            present.push(AuthType::KeyEmail);
        }
        if service_key.is_some() {
            present.push(AuthType::UserServiceKey);
        }
        if token.is_some() {
            present.push(AuthType::ApiToken);
        }

        match present.as_slice() {
            [] => Err(Error::missing_credential(
                "api_token, user_service_key or api_key + api_email",
            )),
            [single] => Ok(*single),
            _ => Err(Error::config(format!(
                "multiple credential schemes configured ({}); set auth_type to choose one",
                present
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }
}

// ============================================================================
// Loading
// ============================================================================

impl ClientConfig {
    /// Parse a YAML profile
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML profile from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Profile built from the environment only
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source
    ///
    /// Setting any credential variable replaces all file credentials so
    /// schemes from different sources are never mixed.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).none_if_empty();

        if let Some(base_url) = var(ENV_BASE_URL) {
            self.base_url = base_url;
        }

        let env_credentials = CredentialsConfig {
            auth_type: None,
            api_key: var(ENV_API_KEY),
            api_email: var(ENV_API_EMAIL),
            user_service_key: var(ENV_API_USER_SERVICE_KEY),
            api_token: var(ENV_API_TOKEN),
        };
        if env_credentials != CredentialsConfig::default() {
            self.credentials = env_credentials;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check values that can be checked without credentials
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.base_url)?;
        if self.timeout_secs == 0 {
            return Err(Error::config("timeout_secs must be greater than zero"));
        }
        if self.retry.min_delay_ms > self.retry.max_delay_ms {
            return Err(Error::config("retry.min_delay_ms exceeds retry.max_delay_ms"));
        }
        Ok(())
    }

    /// Resolve the configured credentials
    pub fn credentials(&self) -> Result<Credentials> {
        self.credentials.resolve()
    }

    /// Executor settings for this profile
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .base_url(self.base_url.clone())
            .timeout(Duration::from_secs(self.timeout_secs))
            .max_retries(self.retry.max_retries)
            .backoff(
                self.retry.backoff,
                Duration::from_millis(self.retry.min_delay_ms),
                Duration::from_millis(self.retry.max_delay_ms),
            );

        builder = match &self.rate_limit {
            Some(rate_limit) => builder.rate_limit(rate_limit.clone()),
            None => builder.no_rate_limit(),
        };

        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        for (key, value) in &self.headers {
            builder = builder.header(key.clone(), value.clone());
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use std::io::Write;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
    }

    #[test]
    fn test_full_profile() {
        let yaml = r"
base_url: https://api.example.com/client/v4
user_agent: my-tool/1.0
timeout_secs: 10
retry:
  max_retries: 0
  min_delay_ms: 0
  max_delay_ms: 0
rate_limit: null
headers:
  X-Custom: value
credentials:
  api_key: deadbeef
  api_email: cloudflare@example.org
";
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.retry.max_retries, 0);
        assert!(config.rate_limit.is_none());
        assert_eq!(config.credentials().unwrap().auth_type(), AuthType::KeyEmail);

        let http = config.http_config();
        assert_eq!(http.base_url, "https://api.example.com/client/v4");
        assert_eq!(http.timeout, Duration::from_secs(10));
        assert_eq!(http.max_retries, 0);
        assert!(http.rate_limit.is_none());
        assert_eq!(http.user_agent, "my-tool/1.0");
        assert_eq!(http.headers.get("X-Custom"), Some(&"value".to_string()));
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ClientConfig::from_yaml_str("base_url: not a url").unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_invalid_retry_bounds() {
        let yaml = "retry:\n  min_delay_ms: 5000\n  max_delay_ms: 10\n";
        assert!(ClientConfig::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn test_credentials_inferred() {
        let creds = CredentialsConfig {
            api_token: Some("token".to_string()),
            ..CredentialsConfig::default()
        };
        assert_eq!(creds.resolve().unwrap().auth_type(), AuthType::ApiToken);

        let creds = CredentialsConfig {
            user_service_key: Some("v1.0-key".to_string()),
            ..CredentialsConfig::default()
        };
        assert_eq!(
            creds.resolve().unwrap().auth_type(),
            AuthType::UserServiceKey
        );
    }

    #[test]
    fn test_credentials_missing() {
        let err = CredentialsConfig::default().resolve().unwrap_err();
        assert!(matches!(err, Error::MissingCredential { .. }));
    }

    #[test]
    fn test_credentials_key_without_email() {
        let creds = CredentialsConfig {
            api_key: Some("deadbeef".to_string()),
            ..CredentialsConfig::default()
        };
        let err = creds.resolve().unwrap_err();
        assert!(matches!(err, Error::MissingCredential { ref field } if field == "api_email"));
    }

    #[test]
    fn test_credentials_ambiguous() {
        let creds = CredentialsConfig {
            api_token: Some("token".to_string()),
            user_service_key: Some("v1.0-key".to_string()),
            ..CredentialsConfig::default()
        };
        let err = creds.resolve().unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        assert!(err.to_string().contains("user_service_key, api_token"));
    }

    #[test]
    fn test_explicit_auth_type_disambiguates() {
        let creds = CredentialsConfig {
            auth_type: Some(AuthType::UserServiceKey),
            api_token: Some("token".to_string()),
            user_service_key: Some("v1.0-key".to_string()),
            ..CredentialsConfig::default()
        };
        assert_eq!(
            creds.resolve().unwrap().auth_type(),
            AuthType::UserServiceKey
        );
    }

    #[test]
    fn test_env_overrides_replace_file_credentials() {
        let yaml = "credentials:\n  api_key: deadbeef\n  api_email: cloudflare@example.org\n";
        let config = ClientConfig::from_yaml_str(yaml)
            .unwrap()
            .with_overrides(vars(&[
                (ENV_API_TOKEN, "env-token"),
                (ENV_BASE_URL, "https://localhost:8443/v4"),
            ]))
            .unwrap();

        assert_eq!(config.base_url, "https://localhost:8443/v4");
        assert_eq!(config.credentials.api_key, None);
        assert_eq!(config.credentials().unwrap().auth_type(), AuthType::ApiToken);
    }

    #[test]
    fn test_empty_env_values_ignored() {
        let yaml = "credentials:\n  api_token: file-token\n";
        let config = ClientConfig::from_yaml_str(yaml)
            .unwrap()
            .with_overrides(vars(&[(ENV_API_TOKEN, ""), (ENV_BASE_URL, "")]))
            .unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.credentials.api_token.as_deref(), Some("file-token"));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs: 5").unwrap();
        writeln!(file, "credentials:").unwrap();
        writeln!(file, "  api_token: file-token").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.credentials().unwrap().auth_type(), AuthType::ApiToken);
    }

    #[test]
    fn test_from_missing_file() {
        let err = ClientConfig::from_file("/nonexistent/cloudflare.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
        assert!(err.is_config_error());
    }
}
