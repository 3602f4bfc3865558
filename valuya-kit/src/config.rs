use std::time::Duration;

use bon::Builder;
use valuya_core::errors::{Error, Result};

/// Environment variable holding the remote service base URL.
pub const BASE_URL_ENV: &str = "BASE_URL";
/// Environment variable holding the optional bearer token.
pub const SITE_TOKEN_ENV: &str = "SITE_TOKEN";

/// Timeout applied to every remote call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Where the remote entitlement service lives.
///
/// ```
/// use valuya_kit::config::RemoteEndpointConfig;
///
/// let config = RemoteEndpointConfig::builder()
///     .base_url("https://valuya.example.com/")
///     .site_token("secret")
///     .build();
///
/// assert_eq!(config.base().unwrap(), "https://valuya.example.com");
/// assert_eq!(config.bearer_token(), Some("secret"));
/// ```
#[derive(Builder, Debug, Clone, PartialEq, Eq)]
pub struct RemoteEndpointConfig {
    #[builder(into)]
    pub base_url: String,
    #[builder(into)]
    pub site_token: Option<String>,
    #[builder(default = DEFAULT_TIMEOUT)]
    pub timeout: Duration,
}

impl RemoteEndpointConfig {
    /// Read `BASE_URL` and `SITE_TOKEN` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key-value source, e.g. a map in tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let config = RemoteEndpointConfig {
            base_url: lookup(BASE_URL_ENV).unwrap_or_default(),
            site_token: lookup(SITE_TOKEN_ENV),
            timeout: DEFAULT_TIMEOUT,
        };
        config.base()?;
        Ok(config)
    }

    /// The base URL without surrounding whitespace or trailing slashes.
    pub fn base(&self) -> Result<&str> {
        let base = self.base_url.trim().trim_end_matches('/');
        if base.is_empty() {
            return Err(Error::Config(format!("Missing {BASE_URL_ENV}")));
        }
        Ok(base)
    }

    /// The site token, if one is configured and non-blank.
    pub fn bearer_token(&self) -> Option<&str> {
        self.site_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
