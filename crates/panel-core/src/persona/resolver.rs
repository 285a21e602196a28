//! Folder-hierarchy persona resolution.

use super::model::{FolderMappings, Persona, PersonaStore, normalize_folder};
use crate::error::{PanelError, Result};
use std::collections::HashSet;

/// The ordered, duplicate-free personas that review one document.
///
/// Derived per review run and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPersonaSet {
    personas: Vec<Persona>,
    /// True when no folder mapping contributed and every persona was used.
    fallback: bool,
}

impl ResolvedPersonaSet {
    pub fn personas(&self) -> &[Persona] {
        &self.personas
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn is_fallback(&self) -> bool {
        self.fallback
    }
}

/// Resolves the personas that apply to `document_path`.
///
/// Mappings of shallower ancestor folders come before deeper ones; an id
/// mapped more than once keeps its first position. Ids that no longer exist
/// in the store are dropped. When nothing survives, every stored persona is
/// used in stored order.
///
/// # Errors
///
/// Returns [`PanelError::NoPersonas`] when the store itself is empty.
pub fn resolve(
    document_path: &str,
    mappings: &FolderMappings,
    store: &PersonaStore,
) -> Result<ResolvedPersonaSet> {
    if store.is_empty() {
        return Err(PanelError::NoPersonas);
    }

    let normalized = normalize_folder(document_path);
    let mut segments: Vec<&str> = normalized.split('/').collect();
    // The last segment is the document itself, never a folder
    segments.pop();

    let mut collected: Vec<&str> = Vec::new();
    let mut prefix = String::new();
    for segment in segments {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(segment);
        if let Some(ids) = mappings.get(&prefix) {
            collected.extend(ids.iter().map(String::as_str));
        }
    }

    let mut seen = HashSet::new();
    let personas: Vec<Persona> = collected
        .into_iter()
        .filter(|id| seen.insert(*id))
        .filter_map(|id| {
            let persona = store.get(id);
            if persona.is_none() {
                tracing::debug!(persona_id = id, "Dropping mapped persona missing from store");
            }
            persona.cloned()
        })
        .collect();

    if personas.is_empty() {
        return Ok(ResolvedPersonaSet {
            personas: store.all().to_vec(),
            fallback: true,
        });
    }

    Ok(ResolvedPersonaSet {
        personas,
        fallback: false,
    })
}
