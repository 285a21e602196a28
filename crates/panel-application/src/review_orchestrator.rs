//! Concurrent fan-out of one generation call per persona.

use crate::synthesis_engine::SynthesisEngine;
use panel_core::notification::{Notice, Notifier};
use panel_core::persona::Persona;
use panel_core::review::{Comment, PersonaFailure, ReviewResult, comments_from_output};
use panel_core::{GenerationBackend, GenerationError, GenerationResponse};
use std::sync::Arc;
use std::time::Duration;

/// Appended to every persona's own instructions.
pub const FEEDBACK_DIRECTIVE: &str = "Your task is to provide feedback on the document. \
Format your response as a bulleted list of specific, actionable points. \
For each point, if possible, include a direct quote from the text in double quotes \
to indicate where the feedback applies.";

/// System instructions sent for one persona.
pub fn persona_instructions(persona: &Persona) -> String {
    format!("{}\n\n{}", persona.instructions, FEEDBACK_DIRECTIVE)
}

/// Runs one generation call, bounded by `timeout` when set.
pub(crate) async fn generate_bounded(
    backend: &dyn GenerationBackend,
    prompt: &str,
    system_instructions: &str,
    timeout: Option<Duration>,
) -> Result<GenerationResponse, GenerationError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, backend.generate(prompt, system_instructions))
            .await
            .unwrap_or_else(|_| Err(GenerationError::timeout(limit))),
        None => backend.generate(prompt, system_instructions).await,
    }
}

/// Comments gathered from every persona before synthesis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedFeedback {
    pub comments: Vec<Comment>,
    pub failures: Vec<PersonaFailure>,
}

/// A finished review plus the personas that contributed nothing because
/// their call failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub result: ReviewResult,
    pub failures: Vec<PersonaFailure>,
}

/// Fans a document out to every resolved persona and aggregates the feedback.
///
/// Each call runs as its own task; one failing, slow or panicking call never
/// affects its siblings. Results are read back in resolution order once every
/// task has settled, so the comment order does not depend on completion
/// order.
pub struct ReviewOrchestrator {
    backend: Arc<dyn GenerationBackend>,
    notifier: Arc<dyn Notifier>,
    request_timeout: Option<Duration>,
}

impl ReviewOrchestrator {
    pub fn new(backend: Arc<dyn GenerationBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            request_timeout: None,
        }
    }

    /// Bounds every generation call (persona and synthesis).
    pub fn with_request_timeout(mut self, request_timeout: Option<Duration>) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    /// Reviews `document` with every persona, then synthesizes once.
    ///
    /// The persona list must not be empty; the use case checks this.
    pub async fn review(&self, document: &str, personas: &[Persona]) -> ReviewOutcome {
        let collected = self.collect_feedback(document, personas).await;

        let synthesis = SynthesisEngine::new(self.backend.clone())
            .with_request_timeout(self.request_timeout)
            .synthesize(&collected.comments)
            .await;

        ReviewOutcome {
            result: ReviewResult {
                comments: collected.comments,
                synthesis,
            },
            failures: collected.failures,
        }
    }

    /// Issues all persona calls concurrently and parses their outputs.
    pub async fn collect_feedback(&self, document: &str, personas: &[Persona]) -> CollectedFeedback {
        let document: Arc<str> = Arc::from(document);

        let handles: Vec<_> = personas
            .iter()
            .map(|persona| {
                let backend = self.backend.clone();
                let document = document.clone();
                let instructions = persona_instructions(persona);
                let timeout = self.request_timeout;
                tokio::spawn(async move {
                    generate_bounded(backend.as_ref(), &document, &instructions, timeout).await
                })
            })
            .collect();

        let mut collected = CollectedFeedback::default();

        for (persona, handle) in personas.iter().zip(handles) {
            let outcome = match handle.await {
                Ok(result) => result.map_err(|e| e.to_string()),
                Err(join_error) => Err(format!("generation task aborted: {join_error}")),
            };

            match outcome {
                Ok(response) => {
                    let comments = comments_from_output(&persona.name, &response.text, &document);
                    tracing::info!(
                        persona = %persona.name,
                        backend = self.backend.name(),
                        comments = comments.len(),
                        prompt_tokens = response.usage.map(|u| u.prompt_tokens),
                        completion_tokens = response.usage.map(|u| u.completion_tokens),
                        "Persona review finished"
                    );
                    collected.comments.extend(comments);
                }
                Err(message) => {
                    tracing::warn!(persona = %persona.name, error = %message, "Persona review failed");
                    self.notifier.notify(Notice::PersonaFailed {
                        persona_name: persona.name.clone(),
                        message: message.clone(),
                    });
                    collected.failures.push(PersonaFailure {
                        persona_name: persona.name.clone(),
                        message,
                    });
                }
            }
        }

        collected
    }
}
