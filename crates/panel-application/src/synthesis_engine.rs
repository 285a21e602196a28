//! Meta-review synthesis over all persona feedback.

use crate::review_orchestrator::generate_bounded;
use panel_core::GenerationBackend;
use panel_core::review::{Comment, NO_FEEDBACK_SYNTHESIS, SYNTHESIS_FAILED};
use std::sync::Arc;
use std::time::Duration;

pub const META_REVIEWER_INSTRUCTIONS: &str = "You are a Meta-Reviewer. \
Your job is to synthesize multiple expert reviews into a cohesive, prioritized summary. \
Identify the most critical issues, high-level themes, and constructive path forward. \
Use professional, executive tone. Use markdown formatting (headings, etc).";

/// Renders feedback as `[persona]: text` lines.
pub fn feedback_digest(comments: &[Comment]) -> String {
    comments
        .iter()
        .map(|c| format!("[{}]: {}", c.persona_name, c.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user prompt of the synthesis call.
pub fn synthesis_prompt(comments: &[Comment]) -> String {
    format!(
        "Here is the feedback from various expert reviewers:\n\n{}\n\n\
Please synthesize this into a \"Bottom Line Up Front\" summary followed by prioritized themes.",
        feedback_digest(comments)
    )
}

/// Produces the narrative summary of a review. Never fails: problems are
/// reported through fixed fallback texts.
pub struct SynthesisEngine {
    backend: Arc<dyn GenerationBackend>,
    request_timeout: Option<Duration>,
}

impl SynthesisEngine {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub async fn synthesize(&self, comments: &[Comment]) -> String {
        if comments.is_empty() {
            return NO_FEEDBACK_SYNTHESIS.to_string();
        }

        let prompt = synthesis_prompt(comments);
        match generate_bounded(
            self.backend.as_ref(),
            &prompt,
            META_REVIEWER_INSTRUCTIONS,
            self.request_timeout,
        )
        .await
        {
            Ok(response) => {
                tracing::info!(
                    backend = self.backend.name(),
                    comments = comments.len(),
                    "Synthesis finished"
                );
                response.text.trim().to_string()
            }
            Err(e) => {
                tracing::error!(error = %e, "Synthesis failed");
                SYNTHESIS_FAILED.to_string()
            }
        }
    }
}
