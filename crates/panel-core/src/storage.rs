//! Document storage capability.
//!
//! Defines the interface the review use case needs from the host's file
//! store. Paths are vault-relative and use `/` separators.

use crate::error::Result;

/// Storage for reviewed documents and their review artifacts.
///
/// # Implementation Notes
///
/// `write` must either fully replace the file or leave it untouched, so a
/// failed run never leaves a half-written artifact behind.
#[async_trait::async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Reads the full text of a document.
    async fn read(&self, path: &str) -> Result<String>;

    /// Checks whether a file or folder exists.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// Creates a folder (and its parents).
    async fn create_folder(&self, path: &str) -> Result<()>;

    /// Writes a file, overwriting any existing content.
    async fn write(&self, path: &str, content: &str) -> Result<()>;

    /// Sets one front-matter field of a document, replacing an existing value.
    async fn set_metadata_field(&self, path: &str, key: &str, value: &str) -> Result<()>;
}
