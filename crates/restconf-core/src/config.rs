use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Retry policy parameters (optional `[retry]` section in config.toml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Minimum backoff delay in seconds.
    pub min_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: f64,
    /// Exponential growth factor per attempt.
    pub delay_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            min_delay_secs: 4.0,
            max_delay_secs: 60.0,
            delay_factor: 3.0,
        }
    }
}

/// Pre-supplied discovery result (optional `[endpoint]` section).
///
/// When present the client never fetches host-meta or capabilities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownEndpoint {
    /// RESTCONF root path, e.g. `/restconf`.
    pub path: String,
    /// Whether the device supports YANG-Patch.
    #[serde(default)]
    pub yang_patch: bool,
}

/// One entry of the `[[transient_rules]]` table.
///
/// String fields are regular expressions matched anywhere in the
/// corresponding error field; unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransientRuleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_app_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_info: Option<String>,
}

fn default_request_timeout_secs() -> u64 {
    60
}

/// Client configuration, loaded from `~/.config/restconf/config.toml` or
/// built in code. Fixed once the client is constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Device base URL, e.g. `https://10.0.0.1`.
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// Allow TLS connections without certificate verification.
    #[serde(default)]
    pub insecure: bool,
    /// Default per-attempt transport timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Skip discovery by supplying the endpoint up front.
    #[serde(default)]
    pub endpoint: Option<KnownEndpoint>,
    /// Replaces the built-in transient rule table when set.
    #[serde(default)]
    pub transient_rules: Option<Vec<TransientRuleConfig>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: "https://127.0.0.1".to_string(),
            username: String::new(),
            password: String::new(),
            insecure: false,
            request_timeout_secs: default_request_timeout_secs(),
            retry: None,
            endpoint: None,
            transient_rules: None,
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            username: username.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn retry_or_default(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("restconf")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ClientConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ClientConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit file.
pub fn load_from(path: &Path) -> Result<ClientConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: ClientConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    Ok(cfg)
}
