//! Configuration domain models.
//!
//! `ReviewConfig` is the validated form of `config.toml`; `SecretConfig`
//! mirrors `secret.json`. Raw "any"-shaped records never leave the loader.

use crate::error::{PanelError, Result};
use crate::persona::{FolderMappings, Persona, PersonaStore};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default folder that receives review artifacts.
pub const DEFAULT_REVIEW_FOLDER: &str = "_reviews";

/// Which backend a review should use.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendPreference {
    /// First backend with credentials: OpenAI, then Claude
    #[default]
    Auto,
    #[serde(rename = "openai")]
    OpenAI,
    Claude,
    Bedrock,
}

/// Raw `config.toml` contents before validation.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ReviewConfigFile {
    #[serde(default = "default_review_folder")]
    pub review_folder: String,
    #[serde(default)]
    pub backend: BackendPreference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(rename = "persona", default)]
    pub personas: Vec<Persona>,
    #[serde(default)]
    pub folder_mappings: FolderMappings,
}

impl Default for ReviewConfigFile {
    fn default() -> Self {
        Self {
            review_folder: default_review_folder(),
            backend: BackendPreference::default(),
            request_timeout_secs: None,
            personas: Vec::new(),
            folder_mappings: FolderMappings::default(),
        }
    }
}

fn default_review_folder() -> String {
    DEFAULT_REVIEW_FOLDER.to_string()
}

/// Validated review configuration.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub review_folder: String,
    pub backend: BackendPreference,
    pub request_timeout: Option<Duration>,
    pub personas: PersonaStore,
    pub folder_mappings: FolderMappings,
}

impl ReviewConfig {
    /// Validates a raw configuration file.
    ///
    /// Mapping entries that name unknown personas are accepted; resolution
    /// drops them.
    pub fn from_file(file: ReviewConfigFile) -> Result<Self> {
        let review_folder = file.review_folder.trim().trim_matches('/').to_string();
        if review_folder.is_empty() {
            return Err(PanelError::config("review_folder must not be empty"));
        }

        if file.request_timeout_secs == Some(0) {
            return Err(PanelError::config("request_timeout_secs must be positive"));
        }

        let personas = PersonaStore::new(file.personas)?;

        for (folder, ids) in file.folder_mappings.iter() {
            for id in ids.iter().filter(|id| personas.get(id).is_none()) {
                tracing::warn!(folder, persona_id = %id, "Folder mapping references unknown persona");
            }
        }

        Ok(Self {
            review_folder,
            backend: file.backend,
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            personas,
            folder_mappings: file.folder_mappings,
        })
    }
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            review_folder: default_review_folder(),
            backend: BackendPreference::default(),
            request_timeout: None,
            personas: PersonaStore::default(),
            folder_mappings: FolderMappings::default(),
        }
    }
}

/// Loads the review configuration from wherever it is kept.
pub trait ReviewConfigRepository: Send + Sync {
    fn load(&self) -> Result<ReviewConfig>;
}

/// Root structure of `secret.json`.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct SecretConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAIConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude: Option<ClaudeConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bedrock: Option<BedrockConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct OpenAIConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ClaudeConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct BedrockConfig {
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

impl SecretConfig {
    /// OpenAI credentials with a non-blank key.
    pub fn usable_openai(&self) -> Option<&OpenAIConfig> {
        self.openai.as_ref().filter(|c| !c.api_key.trim().is_empty())
    }

    /// Claude credentials with a non-blank key.
    pub fn usable_claude(&self) -> Option<&ClaudeConfig> {
        self.claude.as_ref().filter(|c| !c.api_key.trim().is_empty())
    }

    /// Bedrock credentials with both keys present.
    pub fn usable_bedrock(&self) -> Option<&BedrockConfig> {
        self.bedrock.as_ref().filter(|c| {
            !c.access_key_id.trim().is_empty() && !c.secret_access_key.trim().is_empty()
        })
    }
}
