//! # Token Storage
//!
//! Durable storage for the session token.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::error::StorageError;

/// Durable storage for a single bearer token.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Load the stored token, if any.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the storage exists but cannot be read.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Persist a token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the token cannot be written.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Remove the stored token. Succeeds if nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the storage cannot be cleared.
    fn clear(&self) -> Result<(), StorageError>;
}

/// On-disk layout of the session file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(default)]
    token: Option<String>,
}

/// Token stored as JSON in a file.
///
/// The default location is `<config_dir>/netbill/session.json`.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Store the token at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default session file path, if a config directory exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netbill").join("session.json"))
    }

    /// Path of the session file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedSession = serde_json::from_str(&contents)?;
        Ok(persisted.token)
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string_pretty(&PersistedSession {
            token: Some(token.to_string()),
        })?;
        fs::write(&self.path, contents)?;

        tracing::debug!(path = ?self.path, "Saved session token");
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::debug!(path = ?self.path, "Removed session token");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Token kept in memory only.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    /// Create a store holding an initial token.
    #[must_use]
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: Mutex::new(token),
        }
    }

    /// Current stored token.
    #[must_use]
    pub fn stored(&self) -> Option<String> {
        self.token.lock().clone()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<String>, StorageError> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.token.lock() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        *self.token.lock() = None;
        Ok(())
    }
}
