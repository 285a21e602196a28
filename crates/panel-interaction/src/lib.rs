//! Panel interaction: concrete text-generation backends.
//!
//! Credentials come from `secret.json` with environment variables as a
//! fallback. [`select_backend`] turns them plus the configured preference
//! into one [`ConfiguredBackend`].

pub mod bedrock_backend;
pub mod claude_api_backend;
mod http_error;
pub mod openai_api_backend;

pub use bedrock_backend::BedrockBackend;
pub use claude_api_backend::ClaudeApiBackend;
pub use openai_api_backend::OpenAIApiBackend;

use async_trait::async_trait;
use panel_core::config::{BackendPreference, ClaudeConfig, OpenAIConfig, SecretConfig};
use panel_core::{GenerationBackend, GenerationError, GenerationResponse, PanelError, Result};

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL_NAME";
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";
pub const CLAUDE_MODEL_ENV: &str = "CLAUDE_MODEL_NAME";

/// The backend chosen for a run.
#[derive(Clone)]
pub enum ConfiguredBackend {
    OpenAI(OpenAIApiBackend),
    Claude(ClaudeApiBackend),
    Bedrock(BedrockBackend),
}

impl ConfiguredBackend {
    fn inner(&self) -> &dyn GenerationBackend {
        match self {
            Self::OpenAI(backend) => backend,
            Self::Claude(backend) => backend,
            Self::Bedrock(backend) => backend,
        }
    }
}

impl std::fmt::Debug for ConfiguredBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAI(backend) => write!(f, "OpenAI({})", backend.model()),
            Self::Claude(backend) => write!(f, "Claude({})", backend.model()),
            Self::Bedrock(backend) => write!(f, "Bedrock({})", backend.model_id()),
        }
    }
}

#[async_trait]
impl GenerationBackend for ConfiguredBackend {
    fn name(&self) -> &str {
        self.inner().name()
    }

    async fn generate(
        &self,
        prompt: &str,
        system_instructions: &str,
    ) -> std::result::Result<GenerationResponse, GenerationError> {
        self.inner().generate(prompt, system_instructions).await
    }
}

/// Picks the backend for `preference` from the available credentials.
///
/// `Auto` prefers OpenAI, then Claude. Bedrock is only used when asked for
/// explicitly. Missing credentials yield [`PanelError::NoBackend`].
pub fn select_backend(
    secrets: &SecretConfig,
    preference: BackendPreference,
) -> Result<ConfiguredBackend> {
    let openai = || secrets.usable_openai().map(OpenAIApiBackend::from_config);
    let claude = || secrets.usable_claude().map(ClaudeApiBackend::from_config);

    let selected = match preference {
        BackendPreference::Auto => openai()
            .map(ConfiguredBackend::OpenAI)
            .or_else(|| claude().map(ConfiguredBackend::Claude)),
        BackendPreference::OpenAI => openai().map(ConfiguredBackend::OpenAI),
        BackendPreference::Claude => claude().map(ConfiguredBackend::Claude),
        BackendPreference::Bedrock => secrets
            .usable_bedrock()
            .map(|config| ConfiguredBackend::Bedrock(BedrockBackend::from_config(config))),
    };

    match selected {
        Some(backend) => {
            tracing::info!(?preference, backend = ?backend, "Selected generation backend");
            Ok(backend)
        }
        None => Err(PanelError::NoBackend),
    }
}

/// Fills missing OpenAI/Claude credentials from the process environment.
pub fn with_env_fallback(secrets: SecretConfig) -> SecretConfig {
    apply_env_fallback(secrets, |key| std::env::var(key).ok())
}

/// Fills missing OpenAI/Claude credentials through `lookup`.
///
/// Credentials already present in `secrets` always win.
pub fn apply_env_fallback(
    mut secrets: SecretConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> SecretConfig {
    let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if secrets.usable_openai().is_none() {
        if let Some(api_key) = present(OPENAI_API_KEY_ENV) {
            tracing::debug!("Using {OPENAI_API_KEY_ENV} from environment");
            secrets.openai = Some(OpenAIConfig {
                api_key,
                model_name: present(OPENAI_MODEL_ENV),
            });
        }
    }

    if secrets.usable_claude().is_none() {
        if let Some(api_key) = present(ANTHROPIC_API_KEY_ENV) {
            tracing::debug!("Using {ANTHROPIC_API_KEY_ENV} from environment");
            secrets.claude = Some(ClaudeConfig {
                api_key,
                model_name: present(CLAUDE_MODEL_ENV),
            });
        }
    }

    secrets
}
