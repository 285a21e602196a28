//! TOML-based ReviewConfigRepository implementation

use crate::paths::{PanelPaths, config_template};
use crate::storage::ConfigFile;
use panel_core::config::{ReviewConfig, ReviewConfigFile, ReviewConfigRepository};
use panel_core::{PanelError, Result};
use std::path::{Path, PathBuf};

/// Review configuration stored in `config.toml`.
///
/// Validation happens here; TOML handling and locking live in [`ConfigFile`].
pub struct TomlReviewConfigRepository {
    file: ConfigFile,
}

impl TomlReviewConfigRepository {
    /// Creates a repository with the default config path (`<config dir>/panel/config.toml`).
    pub fn new() -> Result<Self> {
        let config_path = PanelPaths::config_file()?;
        Ok(Self {
            file: ConfigFile::new(config_path),
        })
    }

    /// Creates a repository with a custom config path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self {
            file: ConfigFile::new(config_path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the raw file; a missing or empty file yields the defaults.
    pub fn load_file(&self) -> Result<ReviewConfigFile> {
        let json_value = self
            .file
            .read()?
            .unwrap_or_else(|| serde_json::json!({}));

        serde_json::from_value(json_value).map_err(|e| {
            PanelError::config(format!(
                "Failed to deserialize {}: {}",
                self.file.path().display(),
                e
            ))
        })
    }

    /// Writes the starter template unless the file already has content.
    ///
    /// Returns whether the template was written.
    pub fn ensure_template(&self) -> Result<bool> {
        let template = serde_json::to_value(config_template())?;
        Ok(self.file.seed(&template)?)
    }
}

impl ReviewConfigRepository for TomlReviewConfigRepository {
    fn load(&self) -> Result<ReviewConfig> {
        let file = self.load_file()?;
        let config = ReviewConfig::from_file(file)?;
        tracing::debug!(
            path = %self.file.path().display(),
            personas = config.personas.len(),
            "Loaded review configuration"
        );
        Ok(config)
    }
}
