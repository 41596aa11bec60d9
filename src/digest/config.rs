//! Configuration for the digest client.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::error::{DigestError, DigestResult};

/// Environment variable holding the API base URL.
const BASE_URL_ENV: &str = "DIGEST_BASE_URL";
/// Environment variable holding the request timeout in seconds.
const TIMEOUT_ENV: &str = "DIGEST_TIMEOUT_SECS";
/// Environment variable holding an optional bearer token.
const TOKEN_ENV: &str = "DIGEST_TOKEN";

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration for the digest client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Base URL every resource path is appended to.
    pub base_url: String,
    /// Request timeout.
    #[serde(with = "duration_serde")]
    pub request_timeout: Duration,
    /// Connection timeout.
    #[serde(with = "duration_serde")]
    pub connect_timeout: Duration,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Optional bearer token sent as `Authorization`.
    pub bearer_token: Option<String>,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("conversation-digest/{}", env!("CARGO_PKG_VERSION")),
            bearer_token: None,
        }
    }
}

impl DigestConfig {
    /// Create a new config with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a config from `DIGEST_*` environment variables, falling back to defaults.
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unusable value.
    pub fn from_env() -> DigestResult<Self> {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            let secs = raw.trim().parse::<u64>().map_err(|e| {
                DigestError::Config(format!("{TIMEOUT_ENV} must be whole seconds: {e}"))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }

        config.bearer_token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.is_empty());

        config.validate()?;
        Ok(config)
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if the base URL is not http(s) or a timeout is zero.
    pub fn validate(&self) -> DigestResult<()> {
        let url = self.parsed_base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DigestError::Config(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        if self.request_timeout.is_zero() || self.connect_timeout.is_zero() {
            return Err(DigestError::Config("timeouts must be > 0".to_string()));
        }

        Ok(())
    }

    /// Parse the base URL.
    ///
    /// # Errors
    /// Returns an error if the URL is malformed.
    pub fn parsed_base_url(&self) -> DigestResult<Url> {
        Ok(Url::parse(&self.base_url)?)
    }
}

/// Serde module for Duration serialization.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
