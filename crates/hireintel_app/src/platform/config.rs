use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hireintel_engine::{FetchSettings, ReconnectPolicy};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::logging::LogDestination;

pub const DEFAULT_CONFIG_PATH: &str = "./hireintel.ron";
pub const TOKEN_ENV_VAR: &str = "HIREINTEL_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    pub jitter: f64,
    pub max_retries: Option<u32>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        let policy = ReconnectPolicy::default();
        Self {
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
            multiplier: policy.multiplier,
            jitter: policy.jitter,
            max_retries: policy.max_retries,
        }
    }
}

/// Dashboard settings, read from a RON file. Every field is optional in the
/// file; missing ones take their default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub base_url: String,
    pub api_prefix: String,
    pub auth_token: Option<String>,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub per_page: u32,
    pub reconnect: ReconnectConfig,
    pub refresh_interval_ms: u64,
    pub log_destination: LogDestination,
    pub log_level: String,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let fetch = FetchSettings::default();
        Self {
            base_url: fetch.base_url,
            api_prefix: fetch.api_prefix,
            auth_token: None,
            connect_timeout_ms: fetch.connect_timeout.as_millis() as u64,
            request_timeout_ms: fetch.request_timeout.as_millis() as u64,
            per_page: fetch.per_page,
            reconnect: ReconnectConfig::default(),
            refresh_interval_ms: 30_000,
            log_destination: LogDestination::default(),
            log_level: "info".to_string(),
        }
    }
}

impl DashboardConfig {
    /// Replace the token with `token` when it is set and non-empty.
    pub fn with_token_override(mut self, token: Option<String>) -> Self {
        if let Some(token) = token.filter(|token| !token.trim().is_empty()) {
            self.auth_token = Some(token);
        }
        self
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            base_url: self.base_url.clone(),
            api_prefix: self.api_prefix.clone(),
            auth_token: self.auth_token.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            per_page: self.per_page.max(1),
        }
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_delay: Duration::from_millis(self.reconnect.initial_delay_ms),
            max_delay: Duration::from_millis(self.reconnect.max_delay_ms),
            multiplier: self.reconnect.multiplier,
            jitter: self.reconnect.jitter,
            max_retries: self.reconnect.max_retries,
        }
    }

    /// Period of the refresh tick. Never below one second.
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms.max(1_000))
    }

    /// Unknown level names fall back to `Info`.
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }
}

/// Config path from the first command-line argument, else the default.
pub fn config_path(mut args: impl Iterator<Item = String>) -> PathBuf {
    args.next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Read `path`. A missing file is `Ok(None)`.
pub fn read(path: &Path) -> Result<Option<DashboardConfig>, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    ron::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Like `read`, but never fails: problems yield the defaults plus the error
/// so the caller can report it once logging is up.
pub fn load(path: &Path) -> (DashboardConfig, Option<ConfigError>) {
    match read(path) {
        Ok(config) => (config.unwrap_or_default(), None),
        Err(err) => (DashboardConfig::default(), Some(err)),
    }
}
