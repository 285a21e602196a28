//! OpenAIApiBackend - Chat Completions REST backend.
//!
//! Sends the persona instructions as the system message and the document as
//! the user message.

use crate::http_error::{map_http_error, parse_retry_after, request_failed};
use async_trait::async_trait;
use panel_core::config::OpenAIConfig;
use panel_core::{GenerationBackend, GenerationError, GenerationResponse};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const TEMPERATURE: f32 = 0.2;

/// Backend implementation that talks to the OpenAI HTTP API.
#[derive(Clone)]
pub struct OpenAIApiBackend {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: Option<u32>,
}

impl OpenAIApiBackend {
    /// Creates a new backend with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: None,
        }
    }

    /// Builds a backend from `secret.json` credentials.
    ///
    /// Model name defaults to `gpt-4o-mini` if not specified.
    pub fn from_config(config: &OpenAIConfig) -> Self {
        let model = config
            .model_name
            .clone()
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.into());
        Self::new(config.api_key.clone(), model)
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Points the backend at another server (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(
        &self,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<GenerationResponse, GenerationError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH))
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| request_failed("OpenAI", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let retry_after = parse_retry_after(response.headers().get("retry-after"));
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read OpenAI error body".to_string());
            return Err(map_http_error(status, body_text, retry_after));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            GenerationError::MalformedResponse(format!("Failed to parse OpenAI response: {err}"))
        })?;

        extract_response(parsed)
    }
}

#[async_trait]
impl GenerationBackend for OpenAIApiBackend {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(
        &self,
        prompt: &str,
        system_instructions: &str,
    ) -> Result<GenerationResponse, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instructions,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: self.max_tokens,
        };

        tracing::debug!(model = %self.model, "Sending OpenAI chat completion");
        let response = self.send_request(&request).await?;
        if let Some(usage) = response.usage {
            tracing::debug!(
                backend = "openai",
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Generation finished"
            );
        }
        Ok(response)
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

fn extract_response(response: ChatCompletionResponse) -> Result<GenerationResponse, GenerationError> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            GenerationError::MalformedResponse(
                "OpenAI API returned no content in the response".into(),
            )
        })?;

    let mut generated = GenerationResponse::text(text);
    if let Some(usage) = response.usage {
        generated = generated.with_usage(usage.prompt_tokens, usage.completion_tokens);
    }
    Ok(generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let request = ChatCompletionRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "Be terse.",
                },
                ChatMessage {
                    role: "user",
                    content: "Doc",
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "Doc");
        assert!(value.get("max_tokens").is_none());
    }

    #[test]
    fn test_missing_content_is_malformed() {
        let parsed: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(
            extract_response(parsed),
            Err(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_from_config_defaults_model() {
        let backend = OpenAIApiBackend::from_config(&OpenAIConfig {
            api_key: "sk-test".into(),
            model_name: None,
        });
        assert_eq!(backend.model(), DEFAULT_OPENAI_MODEL);
    }
}
