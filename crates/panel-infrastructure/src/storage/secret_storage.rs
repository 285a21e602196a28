//! Secret configuration file storage.
//!
//! Loads API credentials from `secret.json` in the panel config directory.

use crate::paths::PanelPaths;
use panel_core::PanelError;
use panel_core::config::SecretConfig;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during secret storage operations.
#[derive(Debug)]
pub enum SecretStorageError {
    /// Configuration file not found.
    NotFound(PathBuf),
    /// File I/O error.
    IoError(std::io::Error),
    /// JSON parsing error.
    ParseError(serde_json::Error),
    /// Config directory not found.
    ConfigDirNotFound,
}

impl std::fmt::Display for SecretStorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretStorageError::NotFound(path) => {
                write!(f, "Secret file not found at: {}", path.display())
            }
            SecretStorageError::IoError(e) => write!(f, "I/O error: {}", e),
            SecretStorageError::ParseError(e) => write!(f, "JSON parse error: {}", e),
            SecretStorageError::ConfigDirNotFound => {
                write!(f, "Could not determine config directory")
            }
        }
    }
}

impl std::error::Error for SecretStorageError {}

impl From<std::io::Error> for SecretStorageError {
    fn from(e: std::io::Error) -> Self {
        SecretStorageError::IoError(e)
    }
}

impl From<serde_json::Error> for SecretStorageError {
    fn from(e: serde_json::Error) -> Self {
        SecretStorageError::ParseError(e)
    }
}

impl From<SecretStorageError> for PanelError {
    fn from(e: SecretStorageError) -> Self {
        match e {
            SecretStorageError::NotFound(path) => {
                PanelError::not_found("secret file", path.display().to_string())
            }
            SecretStorageError::IoError(err) => err.into(),
            SecretStorageError::ParseError(err) => err.into(),
            SecretStorageError::ConfigDirNotFound => {
                PanelError::config("Could not determine config directory")
            }
        }
    }
}

/// Storage for the secret configuration file (secret.json).
///
/// Read-only; the template is written by [`PanelPaths::ensure_secret_file`].
///
/// # Security Note
///
/// The file is plaintext JSON and should be readable only by its owner.
pub struct SecretStorage {
    path: PathBuf,
}

impl SecretStorage {
    /// Creates a SecretStorage with the default path (`<config dir>/panel/secret.json`).
    pub fn new() -> Result<Self, SecretStorageError> {
        let path = PanelPaths::secret_file().map_err(|_| SecretStorageError::ConfigDirNotFound)?;
        Ok(Self { path })
    }

    /// Creates a SecretStorage with a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the secret configuration from the JSON file.
    ///
    /// # Returns
    ///
    /// - `Err(SecretStorageError::NotFound)`: File doesn't exist
    /// - `Err(SecretStorageError::ParseError)`: Invalid JSON format
    pub fn load(&self) -> Result<SecretConfig, SecretStorageError> {
        if !self.path.exists() {
            return Err(SecretStorageError::NotFound(self.path.clone()));
        }

        let content = fs::read_to_string(&self.path)?;
        let config = serde_json::from_str(&content)?;

        Ok(config)
    }

    /// Loads the secret configuration, treating a missing file as empty.
    ///
    /// Credentials may still come from the environment.
    pub fn load_or_default(&self) -> Result<SecretConfig, SecretStorageError> {
        match self.load() {
            Err(SecretStorageError::NotFound(path)) => {
                tracing::debug!(path = %path.display(), "No secret file; using empty credentials");
                Ok(SecretConfig::default())
            }
            other => other,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
