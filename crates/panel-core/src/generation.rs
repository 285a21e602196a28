//! Text-generation capability.
//!
//! Every backend (OpenAI, Claude, the Bedrock stub, test doubles) is driven
//! through [`GenerationBackend`]. The review core treats any failure it
//! reports uniformly as "the call failed".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Token accounting reported by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

/// Result of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl GenerationResponse {
    /// Creates a response without usage information.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
        }
    }

    pub fn with_usage(mut self, prompt_tokens: u32, completion_tokens: u32) -> Self {
        self.usage = Some(TokenUsage {
            prompt_tokens,
            completion_tokens,
        });
        self
    }
}

/// Errors a backend can report for a single call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The HTTP exchange failed or returned a non-success status.
    #[error("{message}")]
    ProcessError {
        status_code: Option<u16>,
        message: String,
        is_retryable: bool,
        /// Delay requested by the server via `Retry-After`
        retry_after: Option<Duration>,
    },

    /// The call completed but the response could not be used.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Credentials are missing or rejected.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The backend variant cannot serve requests.
    #[error("Unsupported backend: {0}")]
    Unsupported(String),

    /// The caller-level timeout elapsed.
    #[error("Generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    #[error("{0}")]
    Other(String),
}

impl GenerationError {
    pub fn timeout(duration: Duration) -> Self {
        Self::Timeout {
            seconds: duration.as_secs(),
        }
    }

    /// Builds a process error from an HTTP status.
    pub fn http(status_code: u16, message: impl Into<String>, is_retryable: bool) -> Self {
        Self::ProcessError {
            status_code: Some(status_code),
            message: message.into(),
            is_retryable,
            retry_after: None,
        }
    }

    /// Whether retrying the same call could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ProcessError { is_retryable, .. } => *is_retryable,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

/// A text-generation backend.
///
/// `prompt` is the user content (the document under review, or the
/// aggregated feedback for synthesis); `system_instructions` steers the
/// response.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Short identifier used in logs (e.g. `"openai"`).
    fn name(&self) -> &str;

    async fn generate(
        &self,
        prompt: &str,
        system_instructions: &str,
    ) -> Result<GenerationResponse, GenerationError>;
}
