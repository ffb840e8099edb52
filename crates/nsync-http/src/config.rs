//! HTTP backend configuration

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`HttpConfig::base_url`]
pub const BASE_URL_ENV: &str = "NSYNC_BASE_URL";

/// Environment variable overriding [`HttpConfig::token`]
pub const TOKEN_ENV: &str = "NSYNC_API_TOKEN";

/// Remote endpoint settings
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// REST root, e.g. `https://jira.example.com/rest/api/2`
    pub base_url: String,
    /// Bearer token
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// `User-Agent` header
    pub user_agent: String,
}

impl HttpConfig {
    /// Create configuration for `base_url`
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Apply explicit overrides, ignoring empty values
    #[must_use]
    pub fn with_overrides(mut self, base_url: Option<String>, token: Option<String>) -> Self {
        if let Some(base_url) = base_url.filter(|v| !v.is_empty()) {
            self.base_url = base_url;
        }
        if let Some(token) = token.filter(|v| !v.is_empty()) {
            self.token = Some(token);
        }
        self
    }

    /// Apply [`BASE_URL_ENV`] and [`TOKEN_ENV`] overrides
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(std::env::var(BASE_URL_ENV).ok(), std::env::var(TOKEN_ENV).ok())
    }

    /// Base URL without a trailing slash
    #[must_use]
    pub fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/rest/api/2".to_string(),
            token: None,
            timeout_secs: 30,
            user_agent: concat!("nsync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl std::fmt::Debug for HttpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConfig")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_ignore_empty_values() {
        let config = HttpConfig::new("https://a.example.com")
            .with_token("file-token")
            .with_overrides(Some(String::new()), Some("env-token".into()));
        assert_eq!(config.base_url, "https://a.example.com");
        assert_eq!(config.token.as_deref(), Some("env-token"));
    }

    #[test]
    fn root_trims_trailing_slash() {
        assert_eq!(HttpConfig::new("https://a.example.com/rest/").root(), "https://a.example.com/rest");
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", HttpConfig::default().with_token("secret"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: HttpConfig = serde_json::from_str(r#"{ "base_url": "https://x" }"#).unwrap();
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
    }
}
