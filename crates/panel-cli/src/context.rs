use crate::notifier::StderrNotifier;
use anyhow::{Context, Result};
use panel_application::ReviewUseCase;
use panel_core::PanelError;
use panel_core::config::{ReviewConfig, ReviewConfigRepository};
use panel_infrastructure::{FsDocumentStorage, PanelPaths, SecretStorage, TomlReviewConfigRepository};
use panel_interaction::{ConfiguredBackend, select_backend, with_env_fallback};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Resolved locations shared by every command.
#[derive(Debug, Clone)]
pub struct AppContext {
    vault: PathBuf,
    config_path: Option<PathBuf>,
    secrets_path: Option<PathBuf>,
}

impl AppContext {
    pub fn new(vault: PathBuf, config_path: Option<PathBuf>, secrets_path: Option<PathBuf>) -> Self {
        Self {
            vault,
            config_path,
            secrets_path,
        }
    }

    pub fn vault(&self) -> &Path {
        &self.vault
    }

    pub fn config_repository(&self) -> Result<TomlReviewConfigRepository> {
        match &self.config_path {
            Some(path) => Ok(TomlReviewConfigRepository::with_path(path.clone())),
            None => TomlReviewConfigRepository::new().context("Failed to locate config.toml"),
        }
    }

    pub fn secret_path(&self) -> Result<PathBuf> {
        match &self.secrets_path {
            Some(path) => Ok(path.clone()),
            None => PanelPaths::secret_file().context("Failed to locate secret.json"),
        }
    }

    pub fn load_config(&self) -> Result<ReviewConfig> {
        let repository = self.config_repository()?;
        repository
            .load()
            .with_context(|| format!("Failed to load {}", repository.path().display()))
    }

    /// Selects the backend from `secret.json`, falling back to environment
    /// variables for missing keys.
    pub fn backend(&self, config: &ReviewConfig) -> Result<ConfiguredBackend> {
        let secret_path = self.secret_path()?;
        let secrets = SecretStorage::with_path(secret_path.clone())
            .load_or_default()
            .with_context(|| format!("Failed to read {}", secret_path.display()))?;

        Ok(select_backend(&with_env_fallback(secrets), config.backend)?)
    }

    /// Builds the review use case over the vault.
    ///
    /// Missing credentials are not an error here; the use case reports them
    /// when a review is requested. Unreadable secrets are.
    pub fn review_usecase(&self) -> Result<ReviewUseCase> {
        let config = self.load_config()?;
        let backend = match self.backend(&config) {
            Ok(backend) => Some(backend),
            Err(e) if matches!(e.downcast_ref::<PanelError>(), Some(PanelError::NoBackend)) => {
                tracing::debug!("No usable backend");
                None
            }
            Err(e) => return Err(e),
        };

        let usecase = ReviewUseCase::new(
            config,
            Arc::new(FsDocumentStorage::new(self.vault.clone())),
            Arc::new(StderrNotifier),
        );

        Ok(match backend {
            Some(backend) => usecase.with_backend(Arc::new(backend)),
            None => usecase,
        })
    }
}
