//! ClaudeApiBackend - Anthropic Messages REST backend.

use crate::http_error::{map_http_error, parse_retry_after, request_failed};
use async_trait::async_trait;
use panel_core::config::ClaudeConfig;
use panel_core::{GenerationBackend, GenerationError, GenerationResponse};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CLAUDE_MODEL: &str = "claude-3-5-sonnet-20240620";
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const MESSAGES_PATH: &str = "/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;
const TEMPERATURE: f32 = 0.2;

/// Backend implementation that talks to the Claude HTTP API.
#[derive(Clone)]
pub struct ClaudeApiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl ClaudeApiBackend {
    /// Creates a new backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Builds a backend from `secret.json` credentials.
    ///
    /// Model name defaults to `claude-3-5-sonnet-20240620` if not specified.
    pub fn from_config(config: &ClaudeConfig) -> Self {
        let model = config
            .model_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CLAUDE_MODEL.into());
        Self::new(config.api_key.clone(), model)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(
        &self,
        body: &CreateMessageRequest<'_>,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, MESSAGES_PATH))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| request_failed("Claude", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read Claude error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: CreateMessageResponse = response.json().await.map_err(|err| {
            GenerationError::MalformedResponse(format!("Failed to parse Claude response: {err}"))
        })?;

        extract_response(parsed)
    }
}

#[async_trait]
impl GenerationBackend for ClaudeApiBackend {
    fn name(&self) -> &str {
        "claude"
    }

    async fn generate(
        &self,
        prompt: &str,
        system_instructions: &str,
    ) -> Result<GenerationResponse, GenerationError> {
        let request = CreateMessageRequest {
            model: &self.model,
            messages: vec![Message {
                role: "user",
                content: vec![ContentBlock::Text { text: prompt }],
            }],
            max_tokens: self.max_tokens,
            temperature: TEMPERATURE,
            system: Some(system_instructions).filter(|s| !s.trim().is_empty()),
        };

        tracing::debug!(model = %self.model, "Sending Claude message");
        let response = self.send_request(&request).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                backend = "claude",
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation finished"
            );
        }
        Ok(response)
    }
}

#[derive(Serialize)]
struct CreateMessageRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Vec<ContentBlock<'a>>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock<'a> {
    Text { text: &'a str },
}

#[derive(Deserialize)]
struct CreateMessageResponse {
    content: Vec<ContentBlockResponse>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ContentBlockResponse {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

fn extract_response(response: CreateMessageResponse) -> Result<GenerationResponse, GenerationError> {
    let text = response
        .content
        .into_iter()
        .find_map(|block| match block {
            ContentBlockResponse::Text { text } => Some(text),
            ContentBlockResponse::Other => None,
        })
        .ok_or_else(|| {
            GenerationError::MalformedResponse(
                "Claude API returned no text in the response content".into(),
            )
        })?;

    let mut generated = GenerationResponse::text(text);
    if let Some(usage) = response.usage {
        generated = generated.with_usage(usage.input_tokens, usage.output_tokens);
    }
    Ok(generated)
}
