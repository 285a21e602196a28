//! BedrockBackend - placeholder for AWS Bedrock.
//!
//! Requests need SigV4 request signing, which is not implemented. The backend
//! can be configured and selected, but every call fails as unsupported.

use async_trait::async_trait;
use panel_core::config::BedrockConfig;
use panel_core::{GenerationBackend, GenerationError, GenerationResponse};

pub const DEFAULT_BEDROCK_REGION: &str = "us-east-1";
pub const DEFAULT_BEDROCK_MODEL: &str = "anthropic.claude-3-5-sonnet-20240620-v1:0";

#[derive(Debug, Clone)]
pub struct BedrockBackend {
    region: String,
    model_id: String,
}

impl BedrockBackend {
    pub fn from_config(config: &BedrockConfig) -> Self {
        let region = if config.region.trim().is_empty() {
            DEFAULT_BEDROCK_REGION.to_string()
        } else {
            config.region.clone()
        };
        Self {
            region,
            model_id: config
                .model_id
                .clone()
                .unwrap_or_else(|| DEFAULT_BEDROCK_MODEL.into()),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl GenerationBackend for BedrockBackend {
    fn name(&self) -> &str {
        "bedrock"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _system_instructions: &str,
    ) -> Result<GenerationResponse, GenerationError> {
        tracing::warn!(region = %self.region, model = %self.model_id, "Bedrock backend invoked");
        Err(GenerationError::Unsupported(
            "Bedrock requires AWS SigV4 request signing, which is not available".into(),
        ))
    }
}
