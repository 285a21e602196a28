//! Filesystem-backed DocumentStorage implementation

use crate::front_matter;
use crate::storage::write_atomic;
use async_trait::async_trait;
use panel_core::storage::DocumentStorage;
use panel_core::{PanelError, Result};
use std::path::{Component, Path, PathBuf};

/// A vault rooted at a directory on disk.
///
/// Paths handed to this storage are vault-relative; `..` and absolute paths
/// are rejected so nothing outside the root is touched.
#[derive(Debug, Clone)]
pub struct FsDocumentStorage {
    root: PathBuf,
}

impl FsDocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a vault-relative path onto the filesystem.
    pub fn resolve(&self, path: &str) -> Result<PathBuf> {
        let mut resolved = self.root.clone();
        for segment in path.split(['/', '\\']) {
            if segment.is_empty() || segment == "." {
                continue;
            }
            let mut components = Path::new(segment).components();
            match (components.next(), components.next()) {
                (Some(Component::Normal(part)), None) => resolved.push(part),
                _ => {
                    return Err(PanelError::storage(format!(
                        "Path escapes the vault: {path}"
                    )));
                }
            }
        }
        Ok(resolved)
    }

    /// Resolves a path that must name a file rather than the vault root.
    fn resolve_file(&self, path: &str) -> Result<PathBuf> {
        let resolved = self.resolve(path)?;
        if resolved == self.root {
            return Err(PanelError::storage(format!("Not a file path: '{path}'")));
        }
        Ok(resolved)
    }

    async fn write_file(target: PathBuf, content: String) -> Result<()> {
        tokio::task::spawn_blocking(move || write_atomic(&target, content.as_bytes()))
            .await
            .map_err(|e| PanelError::internal(format!("Write task failed: {e}")))??;
        Ok(())
    }
}

#[async_trait]
impl DocumentStorage for FsDocumentStorage {
    async fn read(&self, path: &str) -> Result<String> {
        let target = self.resolve_file(path)?;
        match tokio::fs::read_to_string(&target).await {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PanelError::not_found("document", path))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let target = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&target).await?)
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        let target = self.resolve(path)?;
        tokio::fs::create_dir_all(&target).await?;
        tracing::debug!(folder = %target.display(), "Created folder");
        Ok(())
    }

    async fn write(&self, path: &str, content: &str) -> Result<()> {
        let target = self.resolve_file(path)?;
        Self::write_file(target, content.to_string()).await?;
        tracing::debug!(path, bytes = content.len(), "Wrote document");
        Ok(())
    }

    async fn set_metadata_field(&self, path: &str, key: &str, value: &str) -> Result<()> {
        let content = self.read(path).await?;
        let updated = front_matter::set_field(&content, key, value);
        if updated != content {
            Self::write_file(self.resolve_file(path)?, updated).await?;
        }
        Ok(())
    }
}
