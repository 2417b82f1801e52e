//! # Configuration Persistence
//!
//! Save and load settings to/from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::FileTokenStore;

/// Errors from saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No per-user config directory on this platform.
    #[error("could not determine config directory")]
    NoConfigDir,

    /// Writing the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// URL of the netbill backend.
    pub server_url: String,

    /// Prefix all API calls live under.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,

    /// Request timeout. Unset leaves the transport default.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Where the session token is kept. Defaults to
    /// `<config_dir>/netbill/session.json`.
    #[serde(default)]
    pub token_file: Option<PathBuf>,

    /// Endpoint returning the logged-in operator's profile, if the
    /// backend provides one (e.g. `/users/me`).
    #[serde(default)]
    pub profile_path: Option<String>,
}

fn default_api_prefix() -> String {
    "/api".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8080".to_string(),
            api_prefix: default_api_prefix(),
            request_timeout_secs: None,
            token_file: None,
            profile_path: None,
        }
    }
}

impl Config {
    /// Returns the default config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netbill").join("config.json"))
    }

    /// Loads configuration from the default path, or returns defaults.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::default_path() else {
            tracing::warn!("Could not determine config directory");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Loads configuration from `path`, or returns defaults if the file
    /// is missing or unreadable.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(?path, "Config file not found, using defaults");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!(?path, "Loaded configuration");
                    config
                }
                Err(e) => {
                    tracing::warn!(?path, error = %e, "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(?path, error = %e, "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Saves configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Saves configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;

        tracing::info!(?path, "Saved configuration");
        Ok(())
    }

    /// Base URL for API calls: server URL joined with the API prefix.
    #[must_use]
    pub fn api_base(&self) -> String {
        let server = self.server_url.trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        if prefix.is_empty() {
            server.to_string()
        } else {
            format!("{server}/{prefix}")
        }
    }

    /// Location of the session token file.
    #[must_use]
    pub fn token_path(&self) -> Option<PathBuf> {
        self.token_file.clone().or_else(FileTokenStore::default_path)
    }
}
