//! Configuration loading for txq.
//!
//! Configuration is loaded from a TOML file (default: `txq.toml` in the data
//! directory). A missing file means all defaults; every section and field
//! may be omitted.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use txq_types::Decimal;

/// Default config file name, looked up in the data directory.
pub const CONFIG_FILE: &str = "txq.toml";

/// Root configuration for txq.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local storage configuration.
    pub storage: StorageConfig,
    /// Remote endpoint configuration.
    pub remote: RemoteConfig,
    /// Sync scheduling configuration.
    pub sync: SyncConfig,
    /// Stub server configuration.
    pub serve: ServeConfig,
}

/// Local storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to SQLite database file; relative paths resolve under the data directory.
    #[serde(default = "default_database_path")]
    pub database: PathBuf,
}

/// Remote endpoint configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the remote authority (default: http://127.0.0.1:8080).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout in seconds (default: 15).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Connect timeout in seconds (default: 5).
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Bearer token sent with every submission (optional).
    pub bearer_token: Option<String>,
}

/// Sync scheduling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Seconds between timed passes in `watch` (default: 60).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Reachability probe timeout in seconds (default: 3).
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

/// Stub server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServeConfig {
    /// Bind address for the stub endpoint (default: 127.0.0.1:8080).
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    /// Reject every transaction above this amount (optional).
    pub reject_above: Option<Decimal>,
}

// Default value functions
fn default_database_path() -> PathBuf {
    PathBuf::from("transactions.db")
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_interval_secs() -> u64 {
    60
}

fn default_probe_timeout_secs() -> u64 {
    3
}

fn default_bind_address() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database: default_database_path(),
        }
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            bearer_token: None,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            reject_above: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load configuration, falling back to defaults when the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {}; using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Database path, resolved against the data directory.
    pub fn database_path(&self, data_dir: &Path) -> PathBuf {
        if self.storage.database.is_absolute() {
            self.storage.database.clone()
        } else {
            data_dir.join(&self.storage.database)
        }
    }
}

impl RemoteConfig {
    /// Whole-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl SyncConfig {
    /// Interval between timed passes.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Reachability probe timeout.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Failed to parse configuration file.
    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}
