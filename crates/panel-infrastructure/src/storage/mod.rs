//! Storage layer for atomic file operations.

mod atomic_file;
mod config_file;
mod secret_storage;

pub(crate) use atomic_file::write_atomic;
pub use config_file::{ConfigFile, ConfigFileError};
pub use secret_storage::{SecretStorage, SecretStorageError};
