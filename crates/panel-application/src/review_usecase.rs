//! Review use case implementation.
//!
//! `ReviewUseCase` runs a complete review for one document: persona
//! resolution, the concurrent persona calls, synthesis, and persistence of
//! the artifact next to a link in the reviewed document.

use crate::review_orchestrator::{ReviewOrchestrator, ReviewOutcome};
use chrono::Utc;
use panel_core::config::ReviewConfig;
use panel_core::notification::{Notice, Notifier};
use panel_core::persona::{ResolvedPersonaSet, resolve};
use panel_core::review::codec::document_basename;
use panel_core::review::{
    PersonaFailure, ReviewArtifactHeader, ReviewResult, artifact_file_name, deserialize_review,
    locate, serialize_review,
};
use panel_core::storage::DocumentStorage;
use panel_core::{GenerationBackend, PanelError, Result};
use std::sync::Arc;

/// Front-matter key linking a document to its latest review artifact.
pub const REVIEW_METADATA_KEY: &str = "persona_review";

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewReport {
    /// Vault-relative path of the written artifact
    pub artifact_path: String,
    pub result: ReviewResult,
    pub failures: Vec<PersonaFailure>,
}

/// Use case for reviewing documents and reading stored reviews back.
///
/// # Responsibilities
///
/// - Resolving the personas for a document and rejecting empty configurations
/// - Driving the orchestrator with the configured backend and timeout
/// - Writing the artifact and linking it from the reviewed document
/// - Reporting progress and failures through the notifier
pub struct ReviewUseCase {
    config: ReviewConfig,
    storage: Arc<dyn DocumentStorage>,
    notifier: Arc<dyn Notifier>,
    backend: Option<Arc<dyn GenerationBackend>>,
}

impl ReviewUseCase {
    pub fn new(
        config: ReviewConfig,
        storage: Arc<dyn DocumentStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            storage,
            notifier,
            backend: None,
        }
    }

    /// Sets the backend used for generation. Without one, reviews fail with
    /// [`PanelError::NoBackend`].
    pub fn with_backend(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    /// Personas that would review `document_path`.
    pub fn personas_for(&self, document_path: &str) -> Result<ResolvedPersonaSet> {
        resolve(
            document_path,
            &self.config.folder_mappings,
            &self.config.personas,
        )
    }

    /// Vault-relative path of the artifact for `document_path`.
    pub fn artifact_path(&self, document_path: &str) -> String {
        format!(
            "{}/{}",
            self.config.review_folder,
            artifact_file_name(&document_basename(document_path))
        )
    }

    /// Runs a full review of `document_path` and saves the artifact.
    ///
    /// Configuration problems are reported before any generation call.
    /// Individual persona failures are notified and listed in the report;
    /// read and write failures abort the run.
    pub async fn review_document(&self, document_path: &str) -> Result<ReviewReport> {
        let personas = match self.personas_for(document_path) {
            Ok(set) => set,
            Err(PanelError::NoPersonas) => {
                self.notifier.notify(Notice::NoPersonasConfigured);
                return Err(PanelError::NoPersonas);
            }
            Err(e) => return Err(self.fail(e)),
        };

        let Some(backend) = self.backend.clone() else {
            self.notifier.notify(Notice::NoBackendConfigured);
            return Err(PanelError::NoBackend);
        };

        tracing::info!(
            document = document_path,
            personas = personas.len(),
            fallback = personas.is_fallback(),
            backend = backend.name(),
            "Starting review"
        );
        self.notifier.notify(Notice::ReviewStarted {
            persona_count: personas.len(),
        });

        match self.run(document_path, &personas, backend).await {
            Ok(report) => {
                self.notifier.notify(Notice::ArtifactSaved {
                    path: report.artifact_path.clone(),
                });
                Ok(report)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn run(
        &self,
        document_path: &str,
        personas: &ResolvedPersonaSet,
        backend: Arc<dyn GenerationBackend>,
    ) -> Result<ReviewReport> {
        let document = self.read_document(document_path).await?;

        let ReviewOutcome { result, failures } =
            ReviewOrchestrator::new(backend, self.notifier.clone())
                .with_request_timeout(self.config.request_timeout)
                .review(&document, personas.personas())
                .await;

        let artifact_path = self.save_review(document_path, &result).await?;

        Ok(ReviewReport {
            artifact_path,
            result,
            failures,
        })
    }

    /// Writes the artifact and links it from the reviewed document.
    ///
    /// Returns the artifact path.
    pub async fn save_review(&self, document_path: &str, result: &ReviewResult) -> Result<String> {
        let folder = &self.config.review_folder;
        if !self.storage.exists(folder).await? {
            self.storage.create_folder(folder).await?;
        }

        let header = ReviewArtifactHeader::for_document(document_path, Utc::now());
        let artifact_path = self.artifact_path(document_path);

        self.storage
            .write(&artifact_path, &serialize_review(result, &header))
            .await?;

        self.storage
            .set_metadata_field(
                document_path,
                REVIEW_METADATA_KEY,
                &format!("[[{artifact_path}|Latest Review]]"),
            )
            .await?;

        tracing::info!(artifact = %artifact_path, comments = result.comments.len(), "Review saved");
        Ok(artifact_path)
    }

    /// Reads the stored review of `document_path`, if any.
    ///
    /// Offsets are not persisted; use [`relocate_excerpts`] against the
    /// current document text to recover them.
    pub async fn load_review(&self, document_path: &str) -> Result<Option<ReviewResult>> {
        let artifact_path = self.artifact_path(document_path);
        if !self.storage.exists(&artifact_path).await? {
            return Ok(None);
        }
        let content = self.storage.read(&artifact_path).await?;
        Ok(Some(deserialize_review(&content)))
    }

    /// Current text of a vault document.
    pub async fn read_document(&self, document_path: &str) -> Result<String> {
        self.storage.read(document_path).await
    }

    fn fail(&self, error: PanelError) -> PanelError {
        tracing::error!(error = %error, "Review failed");
        self.notifier.notify(Notice::ReviewFailed {
            message: error.to_string(),
        });
        error
    }
}

/// Anchors each stored excerpt in `document` again.
///
/// Excerpts that are no longer present stay unlocated.
pub fn relocate_excerpts(result: &mut ReviewResult, document: &str) {
    for comment in &mut result.comments {
        if let Some(excerpt) = &comment.excerpt {
            let located = locate(excerpt, document);
            comment.start = located.start;
            comment.end = located.end;
            comment.excerpt = Some(located.excerpt);
        }
    }
}
