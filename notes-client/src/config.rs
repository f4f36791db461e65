//! Client configuration.

use crate::error::{ApiError, ApiResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Environment variable holding the API base URL.
pub const ENV_BASE_URL: &str = "NOTES_API_URL";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "NOTES_API_TIMEOUT_SECS";
/// Environment variable holding the credentials file path.
pub const ENV_CREDENTIALS_PATH: &str = "NOTES_CREDENTIALS_PATH";

/// Configuration for [`crate::ApiClient`] and the credential store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root, including the version prefix (e.g. `http://host/api/v1`).
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Where the file credential store lives. `None` uses the platform config dir.
    pub credentials_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
            credentials_path: None,
        }
    }
}

impl ClientConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup, falling back to defaults.
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_BASE_URL).filter(|u| !u.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = raw.trim().parse().map_err(|_| {
                ApiError::Config(format!("{ENV_TIMEOUT_SECS} must be a number of seconds, got {raw:?}"))
            })?;
        }
        if let Some(path) = lookup(ENV_CREDENTIALS_PATH).filter(|p| !p.trim().is_empty()) {
            config.credentials_path = Some(PathBuf::from(path));
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the base URL is absolute http(s) and the timeout is non-zero.
    pub fn validate(&self) -> ApiResult<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ApiError::Config(format!(
                "base URL must start with http:// or https://, got {url:?}"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ApiError::Config("timeout must be at least one second".to_string()));
        }
        Ok(())
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn normalized_base_url(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Resolved credentials file location.
    pub fn resolve_credentials_path(&self) -> ApiResult<PathBuf> {
        if let Some(path) = &self.credentials_path {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("notes-client").join("credentials.json"))
            .ok_or_else(|| ApiError::Config("no platform config directory available".to_string()))
    }
}
