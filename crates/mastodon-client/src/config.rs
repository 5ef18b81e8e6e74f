//! Connection settings for a Mastodon-compatible server.
//!
//! A [`Config`] is plain data. Setters chain left to right and nothing is
//! validated until a request is built:
//!
//! ```
//! use mastodon_client::Config;
//!
//! let config = Config::new()
//!     .domain("https://mastodon.example")
//!     .api_version("v2")
//!     .token("secret");
//!
//! assert_eq!(config.api_root().unwrap(), "https://mastodon.example/api/v2");
//! ```
//!
//! The same fields can be read from a TOML document the caller already has
//! in memory:
//!
//! ```toml
//! domain = "https://mastodon.example"
//! api_base = "/api/"
//! api_version = "v1"
//! token = "secret"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default path prefix between the domain and the API version.
pub const DEFAULT_API_BASE: &str = "/api/";

/// Default API version.
pub const DEFAULT_API_VERSION: &str = "v1";

/// Server domain, API prefix, API version and bearer token.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheme and host, e.g. `https://mastodon.example`.
    pub domain: Option<String>,
    /// Path prefix placed after the domain.
    pub api_base: String,
    /// API version segment placed after the prefix.
    pub api_version: String,
    /// Bearer token sent with every request when present.
    pub token: Option<String>,
}

impl Config {
    /// Create a config with default prefix and version and no domain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from a TOML string. Missing fields take defaults.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Set the server domain.
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the API path prefix.
    pub fn api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set the API version.
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Domain, prefix and version joined, without a trailing path.
    ///
    /// Fails when no domain has been set.
    pub fn api_root(&self) -> Result<String> {
        let domain = self
            .domain
            .as_deref()
            .ok_or_else(|| Error::Config("domain is not set".to_string()))?;
        Ok(format!("{}{}{}", domain, self.api_base, self.api_version))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: None,
            api_base: DEFAULT_API_BASE.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token: None,
        }
    }
}

// Keeps the token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("domain", &self.domain)
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.domain, None);
        assert_eq!(config.api_base, "/api/");
        assert_eq!(config.api_version, "v1");
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_setters_chain() {
        let config = Config::new()
            .api_version("v1")
            .api_base("/api/")
            .domain("https://example.com")
            .token("token");

        assert_eq!(config.domain.as_deref(), Some("https://example.com"));
        assert_eq!(config.token.as_deref(), Some("token"));
        assert_eq!(config.api_root().unwrap(), "https://example.com/api/v1");
    }

    #[test]
    fn test_api_root_requires_domain() {
        let err = Config::new().api_root().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_toml() {
        let config = Config::from_toml(
            r#"
            domain = "https://example.com"
            api_version = "v2"
            "#,
        )
        .unwrap();

        assert_eq!(config.domain.as_deref(), Some("https://example.com"));
        assert_eq!(config.api_version, "v2");
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert_eq!(config.token, None);
    }

    #[test]
    fn test_from_toml_rejects_bad_input() {
        let err = Config::from_toml("domain = ").unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
    }

    #[test]
    fn test_debug_hides_token() {
        let config = Config::new().token("very-secret");
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("very-secret"));
        assert!(rendered.contains("***"));
    }
}
