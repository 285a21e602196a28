//! `config.toml` on disk, exposed as `serde_json::Value`.
//!
//! The repository layer deserializes and validates the value; this module
//! only knows the file format and how to replace the file safely.

use super::atomic_file::{FileLock, write_atomic};
use panel_core::PanelError;
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigFileError {
    Io(std::io::Error),
    /// The file exists but is not valid TOML
    Parse { path: PathBuf, message: String },
    /// The value has no TOML representation (e.g. a top-level array)
    Encode(String),
    Lock(std::io::Error),
}

impl fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config file I/O failed: {e}"),
            Self::Parse { path, message } => {
                write!(f, "{} is not valid TOML: {message}", path.display())
            }
            Self::Encode(message) => write!(f, "config cannot be written as TOML: {message}"),
            Self::Lock(e) => write!(f, "config file is locked: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {}

impl From<std::io::Error> for ConfigFileError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<ConfigFileError> for PanelError {
    fn from(e: ConfigFileError) -> Self {
        let message = e.to_string();
        match e {
            ConfigFileError::Io(err) => err.into(),
            ConfigFileError::Parse { .. } => PanelError::config(message),
            ConfigFileError::Encode(_) | ConfigFileError::Lock(_) => PanelError::storage(message),
        }
    }
}

/// Handle on one TOML configuration file.
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file. Missing and whitespace-only files yield `None`.
    pub fn read(&self) -> Result<Option<JsonValue>, ConfigFileError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }

        let table: toml::Table = toml::from_str(&content).map_err(|e| ConfigFileError::Parse {
            path: self.path.clone(),
            message: e.message().to_string(),
        })?;
        serde_json::to_value(table)
            .map(Some)
            .map_err(|e| ConfigFileError::Encode(e.to_string()))
    }

    /// Replaces the file atomically. Null fields are dropped since TOML has
    /// no null.
    pub fn write(&self, value: &JsonValue) -> Result<(), ConfigFileError> {
        let mut value = value.clone();
        strip_nulls(&mut value);

        let table: toml::Table =
            serde_json::from_value(value).map_err(|e| ConfigFileError::Encode(e.to_string()))?;
        let text = toml::to_string_pretty(&table).map_err(|e| ConfigFileError::Encode(e.to_string()))?;

        write_atomic(&self.path, text.as_bytes())?;
        Ok(())
    }

    /// Writes `template` only when the file is missing, blank or an empty
    /// table. The check and the write happen under one lock.
    ///
    /// Returns whether the template was written.
    pub fn seed(&self, template: &JsonValue) -> Result<bool, ConfigFileError> {
        let _lock = FileLock::acquire(&self.path).map_err(ConfigFileError::Lock)?;

        let has_content = self
            .read()?
            .is_some_and(|current| current.as_object().is_none_or(|map| !map.is_empty()));
        if has_content {
            return Ok(false);
        }

        self.write(template)?;
        Ok(true)
    }
}

fn strip_nulls(value: &mut JsonValue) {
    match value {
        JsonValue::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        JsonValue::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}
