//! CLI configuration file
//!
//! ```toml
//! [sync]
//! target = "primary"
//! max_in_flight = 8
//!
//! [http]
//! base_url = "https://jira.example.com/rest/api/2"
//! timeout_secs = 30
//! ```
//!
//! `NSYNC_BASE_URL` and `NSYNC_API_TOKEN` override the `[http]` values.

use anyhow::{Context, Result};
use nsync_core::SyncConfig;
use nsync_http::HttpConfig;
use serde::Deserialize;
use std::path::Path;

/// Parsed configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// `[sync]` table
    pub sync: SyncConfig,
    /// `[http]` table
    pub http: HttpConfig,
}

impl CliConfig {
    /// Parse TOML text
    ///
    /// # Errors
    /// Invalid TOML or an invalid `[sync]` table
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("invalid configuration")?;
        config.sync.validate()?;
        Ok(config)
    }

    /// Load from `path` (defaults when absent), then apply env overrides
    ///
    /// # Errors
    /// Unreadable file or invalid configuration
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("failed to load config {}", path.display()))?
            }
            None => Self::default(),
        };
        config.http = config.http.with_env_overrides();
        Ok(config)
    }
}
