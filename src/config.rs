use std::{path::PathBuf, time::Duration};

use crate::error::ConfigError;

pub const ENV_API_URL: &str = "MEDIA_GRAB_API_URL";
pub const ENV_API_KEY: &str = "MEDIA_GRAB_API_KEY";
pub const ENV_API_HOST: &str = "MEDIA_GRAB_API_HOST";
pub const ENV_TIMEOUT_SECS: &str = "MEDIA_GRAB_TIMEOUT_SECS";
pub const ENV_DOWNLOAD_DIR: &str = "MEDIA_GRAB_DOWNLOAD_DIR";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";

/// Connection settings for the metadata API, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Full URL of the metadata endpoint
    pub endpoint_url: String,
    /// Sent as `x-rapidapi-key`
    pub credential_key: String,
    /// Sent as `x-rapidapi-host`
    pub credential_host: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(
        endpoint_url: impl Into<String>,
        credential_key: impl Into<String>,
        credential_host: impl Into<String>,
    ) -> Self {
        Self {
            endpoint_url: endpoint_url.into(),
            credential_key: credential_key.into(),
            credential_host: credential_host.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let endpoint_url = required(ENV_API_URL)?;
        if url::Url::parse(&endpoint_url).is_err() {
            return Err(ConfigError::Invalid { name: ENV_API_URL, value: endpoint_url });
        }

        let mut config = Self::new(endpoint_url, required(ENV_API_KEY)?, required(ENV_API_HOST)?);

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::Invalid { name: ENV_TIMEOUT_SECS, value: raw.clone() })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

/// Folder new downloads are written to unless the user picks another.
pub fn default_download_dir() -> PathBuf {
    std::env::var(ENV_DOWNLOAD_DIR)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR))
}
