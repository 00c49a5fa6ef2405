//! Client configuration
//!
//! Resolution order: built-in defaults, then the TOML config file, then the
//! `API_BASE_URL` environment variable (a `.env` file is honored), then
//! command line flags applied by the binaries.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use crate::api::types::HistoryRange;
use crate::sampler::LIVE_WINDOW;

const API_BASE_URL: &str = "API_BASE_URL";

const APP_DIR: &str = "instance-deck";

/// Client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (all endpoint paths are appended to it)
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in seconds (default: 10)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Live metrics poll interval in seconds (default: 2)
    #[serde(default = "default_live_interval")]
    pub live_interval_secs: u64,

    /// Number of live samples kept for charting (default and maximum: 60)
    #[serde(default = "default_live_window")]
    pub live_window: usize,

    /// Range requested from the metrics history endpoint (default: 1h)
    #[serde(default)]
    pub history_range: HistoryRange,

    /// Where the session and selected instance are persisted
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Enable debug logging (default: false)
    #[serde(default)]
    pub debug: bool,
}

fn default_api_url() -> String {
    "http://localhost:8000/api".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

fn default_live_interval() -> u64 {
    2
}

fn default_live_window() -> usize {
    60
}

impl Config {
    /// Load configuration from file, or use defaults if file doesn't exist
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv::dotenv().ok();

        let config_path = path.map(|p| p.to_path_buf()).or_else(|| {
            let default_path = dirs::config_dir()?.join(APP_DIR).join("config.toml");
            if default_path.exists() {
                Some(default_path)
            } else {
                None
            }
        });

        let config = if let Some(path) = config_path {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;

            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
        } else {
            Self::default()
        };

        let config = config.with_env_overrides(std::env::var(API_BASE_URL).ok());
        trace!("loaded config: {config:?}");

        Ok(config)
    }

    /// Parse a TOML document, filling in defaults for missing keys
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content)?;

        let window = config.live_window.clamp(1, LIVE_WINDOW);
        if window != config.live_window {
            warn!(
                "live_window = {} is out of range, using {}",
                config.live_window, window
            );
            config.live_window = window;
        }

        Ok(config)
    }

    /// Apply an `API_BASE_URL` value, ignoring blanks
    pub fn with_env_overrides(self, api_base_url: Option<String>) -> Self {
        match api_base_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => Self {
                api_url: url,
                ..self
            },
            None => self,
        }
    }

    /// Base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    /// File holding the persisted session and selected instance
    pub fn state_path(&self) -> PathBuf {
        self.state_file.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("state.json")
        })
    }

    /// Directory for log files
    pub fn log_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(APP_DIR)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout(),
            live_interval_secs: default_live_interval(),
            live_window: default_live_window(),
            history_range: HistoryRange::default(),
            state_file: None,
            debug: false,
        }
    }
}
