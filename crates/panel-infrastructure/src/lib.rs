pub mod front_matter;
pub mod fs_document_storage;
pub mod paths;
pub mod storage;
pub mod toml_review_config_repository;

pub use crate::fs_document_storage::FsDocumentStorage;
pub use crate::paths::PanelPaths;
pub use crate::storage::{SecretStorage, SecretStorageError};
pub use crate::toml_review_config_repository::TomlReviewConfigRepository;
