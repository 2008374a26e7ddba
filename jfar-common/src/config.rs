//! Bootstrap configuration loading and validation
//!
//! Configuration is resolved once at startup, in priority order:
//! 1. Command-line arguments (highest priority)
//! 2. Environment variables (`JFAR_CONFIG`, `JFAR_JELLYFIN_URL`, `JFAR_API_KEY`)
//! 3. Config file (JSON or TOML, picked by extension)
//! 4. Compiled defaults (fallback)
//!
//! The CLI layer folds 1 and 2 into [`ConfigOverrides`]; this module folds in
//! the file and the defaults and validates the result into an [`AppConfig`].

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Directory name under the user config dir
pub const APP_DIR_NAME: &str = "jellyfin-autorefresh-new-releases";

pub const DEFAULT_DESIRED_IMAGE_HEIGHT: u16 = 360;
pub const DEFAULT_LOOKBACK_DAYS: u32 = 3;
/// Largest accepted window (a century)
pub const MAX_LOOKBACK_DAYS: u32 = 36_500;
pub const DEFAULT_PACING_DELAY_MS: u64 = 2000;
pub const DEFAULT_PROPAGATION_DELAY_MS: u64 = 5000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Config file contents as written by the user
///
/// Keys follow the camelCase names of the JSON config; snake_case aliases are
/// accepted so TOML files read naturally.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(rename = "jellyfinURL", alias = "jellyfin_url", default)]
    pub jellyfin_url: Option<String>,

    #[serde(rename = "apiKey", alias = "api_key", default)]
    pub api_key: Option<String>,

    #[serde(
        rename = "desiredImageHeight",
        alias = "desired_image_height",
        default = "default_desired_image_height"
    )]
    pub desired_image_height: u16,

    #[serde(
        rename = "lookbackDays",
        alias = "lookback_days",
        default = "default_lookback_days"
    )]
    pub lookback_days: u32,

    #[serde(
        rename = "pacingDelayMs",
        alias = "pacing_delay_ms",
        default = "default_pacing_delay_ms"
    )]
    pub pacing_delay_ms: u64,

    #[serde(
        rename = "propagationDelayMs",
        alias = "propagation_delay_ms",
        default = "default_propagation_delay_ms"
    )]
    pub propagation_delay_ms: u64,

    #[serde(
        rename = "requestTimeoutSecs",
        alias = "request_timeout_secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            jellyfin_url: None,
            api_key: None,
            desired_image_height: default_desired_image_height(),
            lookback_days: default_lookback_days(),
            pacing_delay_ms: default_pacing_delay_ms(),
            propagation_delay_ms: default_propagation_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_desired_image_height() -> u16 {
    DEFAULT_DESIRED_IMAGE_HEIGHT
}

fn default_lookback_days() -> u32 {
    DEFAULT_LOOKBACK_DAYS
}

fn default_pacing_delay_ms() -> u64 {
    DEFAULT_PACING_DELAY_MS
}

fn default_propagation_delay_ms() -> u64 {
    DEFAULT_PROPAGATION_DELAY_MS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub jellyfin_url: Option<String>,
    pub api_key: Option<String>,
    pub desired_image_height: Option<u16>,
    pub lookback_days: Option<u32>,
    pub log_level: Option<String>,
}

/// Media server credential
///
/// Never printed; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !is_valid_key(&key) {
            return Err(Error::Config("Empty API key was provided".to_string()));
        }
        Ok(Self(key.trim().to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Validated configuration for one run
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server base URL without trailing slash
    pub jellyfin_url: String,
    pub api_key: ApiKey,
    pub desired_image_height: u16,
    pub lookback_days: u32,
    pub pacing_delay: Duration,
    pub propagation_delay: Duration,
    pub request_timeout: Duration,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Resolve and validate configuration from overrides plus the config file
    ///
    /// An explicitly named config file must exist. The default file may be
    /// absent as long as the overrides carry both URL and API key.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let file = match &overrides.config_path {
            Some(path) => Some(load_file_config(path)?),
            None => match default_config_path() {
                Some(path) => {
                    debug!(path = %path.display(), "Loading default config file");
                    Some(load_file_config(&path)?)
                }
                None if overrides.jellyfin_url.is_some() && overrides.api_key.is_some() => None,
                None => {
                    return Err(Error::Config(format!(
                        "Could not load config from {}",
                        default_config_dir()
                            .map(|d| d.join("config.json").display().to_string())
                            .unwrap_or_else(|| format!("<config dir>/{APP_DIR_NAME}/config.json"))
                    )))
                }
            },
        };

        Self::from_parts(file.unwrap_or_default(), overrides)
    }

    /// Merge a parsed file with overrides and validate
    pub fn from_parts(file: FileConfig, overrides: ConfigOverrides) -> Result<Self> {
        let raw_url = overrides
            .jellyfin_url
            .or(file.jellyfin_url)
            .ok_or_else(|| Error::Config("Jellyfin URL was not provided".to_string()))?;
        let jellyfin_url = validate_url(&raw_url)?;

        let api_key = ApiKey::new(overrides.api_key.or(file.api_key).unwrap_or_default())?;

        let desired_image_height = overrides
            .desired_image_height
            .unwrap_or(file.desired_image_height);
        if desired_image_height == 0 {
            return Err(Error::Config(
                "desiredImageHeight must be a positive integer".to_string(),
            ));
        }

        let lookback_days = overrides.lookback_days.unwrap_or(file.lookback_days);
        if lookback_days == 0 {
            return Err(Error::Config(
                "lookbackDays must be a positive integer".to_string(),
            ));
        }
        if lookback_days > MAX_LOOKBACK_DAYS {
            return Err(Error::Config(format!(
                "lookbackDays must be at most {MAX_LOOKBACK_DAYS}, got {lookback_days}"
            )));
        }

        if file.request_timeout_secs == 0 {
            return Err(Error::Config(
                "requestTimeoutSecs must be a positive integer".to_string(),
            ));
        }

        let logging = match overrides.log_level {
            Some(level) => LoggingConfig { level },
            None => file.logging,
        };

        info!(
            url = %jellyfin_url,
            desired_image_height,
            lookback_days,
            "Configuration resolved"
        );

        Ok(Self {
            jellyfin_url,
            api_key,
            desired_image_height,
            lookback_days,
            pacing_delay: crate::time::millis_to_duration(file.pacing_delay_ms),
            propagation_delay: crate::time::millis_to_duration(file.propagation_delay_ms),
            request_timeout: Duration::from_secs(file.request_timeout_secs),
            logging,
        })
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Check that the URL is absolute http(s) with a host; returns it without a trailing slash
pub fn validate_url(raw: &str) -> Result<String> {
    let parsed = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("Invalid URL was provided: {raw} ({e})")))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(Error::Config(format!("Invalid URL was provided: {raw}")));
    }

    Ok(raw.trim().trim_end_matches('/').to_string())
}

/// Parse a config file, picking the format by extension (TOML for `.toml`, JSON otherwise)
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Could not load config from {}: {}", path.display(), e))
    })?;

    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

    if is_toml {
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Error reading config {}: {}", path.display(), e)))
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Error reading config {}: {}", path.display(), e)))
    }
}

/// `$XDG_CONFIG_HOME/<app>` when set, otherwise the platform config dir
pub fn default_config_dir() -> Option<PathBuf> {
    match std::env::var_os("XDG_CONFIG_HOME") {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir).join(APP_DIR_NAME)),
        _ => dirs::config_dir().map(|d| d.join(APP_DIR_NAME)),
    }
}

/// First existing default config file (`config.json`, then `config.toml`)
pub fn default_config_path() -> Option<PathBuf> {
    let dir = default_config_dir()?;
    ["config.json", "config.toml"]
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}
