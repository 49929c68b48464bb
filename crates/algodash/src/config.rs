//! Application configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use algodash_ws::SocketConfig;

use crate::error::{AppError, AppResult};

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin of the control API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Push socket URL. Derived from `base_url` when unset.
    #[serde(default)]
    pub ws_url: Option<String>,

    /// Fixed reconnect delay for the push socket.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Maximum suggestions rendered at once.
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,

    /// Preferences file (theme).
    #[serde(default = "default_prefs_path")]
    pub prefs_path: PathBuf,

    /// Log filter used when `RUST_LOG` is unset.
    #[serde(default)]
    pub log_level: Option<String>,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_suggestion_limit() -> usize {
    200
}

fn default_prefs_path() -> PathBuf {
    PathBuf::from("algodash-prefs.json")
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            ws_url: None,
            reconnect_delay_ms: default_reconnect_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            suggestion_limit: default_suggestion_limit(),
            prefs_path: default_prefs_path(),
            log_level: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }

    /// Load from `path` if the file exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Push socket settings.
    pub fn socket_config(&self) -> SocketConfig {
        match &self.ws_url {
            Some(url) => SocketConfig {
                url: url.clone(),
                reconnect_delay_ms: self.reconnect_delay_ms,
            },
            None => SocketConfig::from_base_url(&self.base_url, self.reconnect_delay_ms),
        }
    }
}
