//! Persona domain module.
//!
//! # Module Structure
//!
//! - `model`: Core persona domain models (`Persona`, `PersonaStore`, `FolderMappings`)
//! - `resolver`: Folder-hierarchy resolution of the personas that review a document
//! - `preset`: Default reviewer personas written by `panel init`
//!
//! # Usage
//!
//! ```ignore
//! use panel_core::persona::{resolve, FolderMappings, PersonaStore};
//! ```

mod model;
mod preset;
mod resolver;

// Re-export public API
pub use model::{FolderMappings, Persona, PersonaStore};
pub use preset::get_default_presets;
pub use resolver::{ResolvedPersonaSet, resolve};
