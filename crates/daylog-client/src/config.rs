//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/daylog/config.toml` by default. Every section is optional.
//!
//! ```toml
//! [backend]
//! kind = "rest"
//! base_url = "http://localhost:8080"
//! token = "env::DAYLOG_TOKEN"
//! timeout = 30
//!
//! [display]
//! time_format = "h12"
//! empty_text = "Free day"
//! ```

use std::path::{Path, PathBuf};

use daylog_core::{FormatOptions, TimeFormat};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the daylog client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    pub backend: BackendSettings,

    pub display: DisplaySettings,
}

/// Which backend to talk to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// The daylog server.
    #[default]
    Rest,
    /// A local JSON document.
    File,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub kind: BackendKind,

    /// Server base URL.
    pub base_url: String,

    /// Bearer token (supports `env::`, `file::` and `pass::` prefixes).
    pub token: Option<String>,

    /// Path of the JSON document used by the file backend.
    pub snapshot_path: Option<PathBuf>,

    /// Request timeout in seconds.
    pub timeout: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            kind: BackendKind::Rest,
            base_url: "http://localhost:8080".to_string(),
            token: None,
            snapshot_path: None,
            timeout: 30,
        }
    }
}

impl BackendSettings {
    /// The file backend path, defaulting to the data directory.
    pub fn snapshot_path(&self) -> PathBuf {
        self.snapshot_path
            .clone()
            .unwrap_or_else(|| ClientConfig::default_data_dir().join("daylog.json"))
    }
}

/// Display settings for output formatting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Maximum title length (truncated with ellipsis).
    pub max_title_length: Option<usize>,

    pub time_format: TimeFormat,

    /// Text to show for a day with nothing on it.
    pub empty_text: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        let defaults = FormatOptions::default();
        Self {
            max_title_length: defaults.max_title_length,
            time_format: defaults.time_format,
            empty_text: defaults.empty_text,
        }
    }
}

impl DisplaySettings {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            max_title_length: self.max_title_length,
            time_format: self.time_format,
            empty_text: self.empty_text.clone(),
            ..FormatOptions::default()
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if the file
    /// does not exist.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daylog")
    }

    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("daylog")
    }
}
