//! Client configuration
//!
//! A [`ClientConfig`] can be assembled in code with the builder, loaded
//! from a YAML or JSON file, or seeded from the environment.
//!
//! ```yaml
//! base_url: https://api.example.com
//! credentials:
//!   type: secret_key
//!   key: sk_test_123
//! timeout_ms: 30000
//! governor:
//!   max_requests: 50
//!   window_ms: 60000
//!   request_delay_ms: 100
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::governor::GovernorConfig;
use crate::types::{duration_ms, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable holding the secret API key
pub const SECRET_KEY_ENV: &str = "PAYGATE_SECRET_KEY";

/// Environment variable overriding the base URL
pub const BASE_URL_ENV: &str = "PAYGATE_BASE_URL";

// ============================================================================
// Credentials
// ============================================================================

/// How requests authenticate against the API
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Credentials {
    /// No authentication
    #[default]
    None,

    /// Secret API key sent as the Basic username with an empty password
    SecretKey { key: String },

    /// HTTP Basic authentication
    Basic { username: String, password: String },

    /// Bearer token authentication
    Bearer { token: String },
}

impl Credentials {
    /// Secret-key credentials
    pub fn secret_key(key: impl Into<String>) -> Self {
        Self::SecretKey { key: key.into() }
    }

    /// Check whether any credentials are configured
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::SecretKey { .. } => f.write_str("SecretKey(***)"),
            Self::Basic { username, .. } => write!(f, "Basic({username}, ***)"),
            Self::Bearer { .. } => f.write_str("Bearer(***)"),
        }
    }
}

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for [`crate::http::HttpClient`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL for all requests
    pub base_url: Option<String>,
    /// Authentication
    pub credentials: Credentials,
    /// Request timeout
    #[serde(rename = "timeout_ms", with = "duration_ms")]
    pub timeout: Duration,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
    /// Whether the token bucket interceptor is installed
    pub rate_limit: bool,
    /// Rate limit and retry settings
    pub governor: GovernorConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            credentials: Credentials::None,
            timeout: Duration::from_secs(30),
            default_headers: StringMap::new(),
            user_agent: format!("paygate/{}", env!("CARGO_PKG_VERSION")),
            rate_limit: true,
            governor: GovernorConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Parse a YAML document (JSON is valid YAML)
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&contents),
            Some("yaml" | "yml") => Self::from_yaml_str(&contents),
            other => Err(Error::config(format!(
                "unsupported config file extension: {}",
                other.unwrap_or("<none>")
            ))),
        }
    }

    /// Default config with the secret key (required) and base URL taken
    /// from the environment
    pub fn from_env() -> Result<Self> {
        let key = std::env::var(SECRET_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::missing_field(SECRET_KEY_ENV))?;

        let mut builder = Self::builder().credentials(Credentials::secret_key(key));
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            builder = builder.base_url(base_url);
        }
        Ok(builder.build())
    }

    /// Check the config for values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)?;
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be non-zero"));
        }
        self.governor.validate()
    }
}

/// Builder for client config
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = Some(url.into());
        self
    }

    /// Set credentials
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Authenticate with a secret API key
    pub fn secret_key(self, key: impl Into<String>) -> Self {
        self.credentials(Credentials::secret_key(key))
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Replace the governor config
    pub fn governor(mut self, governor: GovernorConfig) -> Self {
        self.config.governor = governor;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.governor.max_retries = retries;
        self
    }

    /// Set retry backoff bounds
    pub fn retry_delays(mut self, base: Duration, max: Duration) -> Self {
        self.config.governor.base_retry_delay = base;
        self.config.governor.max_retry_delay = max;
        self
    }

    /// Disable the token bucket (retries still apply)
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = false;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}
