//! Unified path management for panel configuration files.
//!
//! ```text
//! ~/.config/panel/      # Config directory (platform specific)
//! ├── config.toml       # Personas, folder mappings, backend preference
//! └── secret.json       # API keys
//! ```

use panel_core::config::{
    BedrockConfig, ClaudeConfig, OpenAIConfig, ReviewConfigFile, SecretConfig,
};
use panel_core::persona::{FolderMappings, get_default_presets};
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "panel";
const CONFIG_FILE_NAME: &str = "config.toml";
const SECRET_FILE_NAME: &str = "secret.json";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Platform config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

impl From<PathError> for panel_core::PanelError {
    fn from(e: PathError) -> Self {
        panel_core::PanelError::config(e.to_string())
    }
}

/// Unified path management for panel.
pub struct PanelPaths;

impl PanelPaths {
    /// Returns the panel configuration directory (e.g. `~/.config/panel/`).
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR_NAME))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Returns the path to the secrets file.
    ///
    /// # Security Note
    ///
    /// Ensure this file has appropriate permissions (e.g., 600) to prevent
    /// unauthorized access.
    pub fn secret_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join(SECRET_FILE_NAME))
    }

    /// Ensures the secret file exists, creating it with a template if it doesn't.
    ///
    /// The template lists every backend with empty keys. On Unix the file is
    /// restricted to mode 600.
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: Template written
    /// - `Ok(false)`: File already existed and was left untouched
    pub fn ensure_secret_file(secret_path: &Path) -> Result<bool, std::io::Error> {
        if secret_path.exists() {
            return Ok(false);
        }

        if let Some(parent) = secret_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let template_json = serde_json::to_string_pretty(&secret_template())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;

        std::fs::write(secret_path, template_json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(secret_path, permissions)?;
        }

        Ok(true)
    }
}

fn secret_template() -> SecretConfig {
    SecretConfig {
        openai: Some(OpenAIConfig {
            api_key: String::new(),
            model_name: Some("gpt-4o-mini".to_string()),
        }),
        claude: Some(ClaudeConfig {
            api_key: String::new(),
            model_name: Some("claude-3-5-sonnet-20240620".to_string()),
        }),
        bedrock: Some(BedrockConfig {
            region: "us-east-1".to_string(),
            access_key_id: String::new(),
            secret_access_key: String::new(),
            model_id: None,
        }),
    }
}

/// Starter `config.toml` contents: the preset personas, no folder mappings.
pub fn config_template() -> ReviewConfigFile {
    ReviewConfigFile {
        personas: get_default_presets(),
        folder_mappings: FolderMappings::new(),
        ..Default::default()
    }
}
