//! Configuration management for the portal client.

use crate::{CoreError, CoreResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default API origin (can be overridden at compile time via MENTOR_PORTAL_API_BASE_URL env var).
pub const DEFAULT_API_BASE_URL: &str = match option_env!("MENTOR_PORTAL_API_BASE_URL") {
    Some(url) => url,
    None => "http://localhost:5000",
};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_API_BASE_URL: &str = "MENTOR_PORTAL_API_BASE_URL";
const ENV_LOG_LEVEL: &str = "MENTOR_PORTAL_LOG_LEVEL";

/// Path segment every backend route lives under.
const API_PREFIX: &str = "/api";

/// Main portal configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// API origin, without the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Optional per-request timeout. Requests run to completion when unset.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the config file, falling back to defaults.
    /// Environment variables win over file values.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.api_url()?;

        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, paths: &Paths) -> CoreResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    fn load_from_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from a variable lookup (the process environment in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
    }

    /// Base URL every endpoint path is appended to (`<origin>/api`).
    pub fn api_url(&self) -> CoreResult<String> {
        let origin = self.api_base_url.trim_end_matches('/');
        let parsed = Url::parse(origin)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(CoreError::Config(format!(
                "API base URL must be http or https, got {}",
                parsed.scheme()
            )));
        }
        Ok(format!("{}{}", origin, API_PREFIX))
    }

    /// Request timeout, if one is configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
