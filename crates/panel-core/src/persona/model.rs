//! Persona domain model.
//!
//! Personas and folder mappings are validated when configuration is loaded,
//! so resolution never has to second-guess them.

use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// A named reviewer profile.
///
/// The instructions bias a generation call toward this reviewer's kind of
/// feedback (logic, style, legal exposure, ...).
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    /// Unique identifier within the store
    pub id: String,
    /// Display name used as the section header of a review artifact
    pub name: String,
    /// Free-text system instructions for this reviewer
    #[serde(default)]
    pub instructions: String,
}

impl Persona {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        instructions: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            instructions: instructions.into(),
        }
    }
}

/// An ordered snapshot of every configured persona.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonaStore {
    personas: Vec<Persona>,
}

impl PersonaStore {
    /// Builds a store, rejecting blank or duplicate identifiers and blank names.
    ///
    /// Ids and names are trimmed; names are read back from artifact headers
    /// in trimmed form.
    pub fn new(personas: Vec<Persona>) -> Result<Self> {
        let personas: Vec<Persona> = personas
            .into_iter()
            .map(|persona| Persona {
                id: persona.id.trim().to_string(),
                name: persona.name.trim().to_string(),
                instructions: persona.instructions,
            })
            .collect();

        let mut seen = HashSet::new();
        for persona in &personas {
            if persona.id.is_empty() {
                return Err(PanelError::config("persona id must not be empty"));
            }
            if persona.name.is_empty() {
                return Err(PanelError::config(format!(
                    "persona '{}' must have a name",
                    persona.id
                )));
            }
            // Names become section headers of the review artifact
            if persona.name.contains(['\n', '\r']) {
                return Err(PanelError::config(format!(
                    "persona '{}' name must be a single line",
                    persona.id
                )));
            }
            if !seen.insert(persona.id.as_str()) {
                return Err(PanelError::config(format!(
                    "duplicate persona id '{}'",
                    persona.id
                )));
            }
        }
        Ok(Self { personas })
    }

    pub fn get(&self, id: &str) -> Option<&Persona> {
        self.personas.iter().find(|p| p.id == id)
    }

    /// All personas in stored order.
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }
}

/// Folder path to persona identifiers.
///
/// Keys are normalized on insertion (`"/work/contracts/"` and
/// `"work/contracts"` are the same folder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Vec<String>>", into = "BTreeMap<String, Vec<String>>")]
pub struct FolderMappings {
    mappings: BTreeMap<String, Vec<String>>,
}

impl FolderMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps a folder to persona ids, replacing any earlier mapping for it.
    pub fn insert(&mut self, folder: &str, persona_ids: Vec<String>) {
        self.mappings.insert(normalize_folder(folder), persona_ids);
    }

    /// Builder-style variant of [`FolderMappings::insert`].
    pub fn with(mut self, folder: &str, persona_ids: &[&str]) -> Self {
        self.insert(folder, persona_ids.iter().map(|id| id.to_string()).collect());
        self
    }

    /// Persona ids mapped to exactly this (normalized) folder.
    pub fn get(&self, folder: &str) -> Option<&[String]> {
        self.mappings.get(folder).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.mappings
            .iter()
            .map(|(folder, ids)| (folder.as_str(), ids.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

impl From<BTreeMap<String, Vec<String>>> for FolderMappings {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut mappings = FolderMappings::new();
        for (folder, ids) in raw {
            mappings.insert(&folder, ids);
        }
        mappings
    }
}

impl From<FolderMappings> for BTreeMap<String, Vec<String>> {
    fn from(mappings: FolderMappings) -> Self {
        mappings.mappings
    }
}

/// Normalizes a folder key: trims whitespace and surrounding separators,
/// collapses empty segments and uses `/` throughout.
pub(crate) fn normalize_folder(folder: &str) -> String {
    folder
        .trim()
        .split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_rejects_duplicate_ids() {
        let result = PersonaStore::new(vec![
            Persona::new("logic", "Logic Critic", ""),
            Persona::new("logic", "Another", ""),
        ]);
        assert!(matches!(result, Err(PanelError::Config(_))));
    }

    #[test]
    fn test_store_rejects_blank_name() {
        let result = PersonaStore::new(vec![Persona::new("logic", "  ", "")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_store_trims_ids_and_names() {
        let store = PersonaStore::new(vec![Persona::new(" logic ", "Logic Critic ", "Find gaps.")])
            .unwrap();
        let persona = store.get("logic").unwrap();
        assert_eq!(persona.name, "Logic Critic");
        assert_eq!(persona.instructions, "Find gaps.");

        let result = PersonaStore::new(vec![
            Persona::new("logic", "A", ""),
            Persona::new("logic ", "B", ""),
        ]);
        assert!(matches!(result, Err(PanelError::Config(_))));
    }

    #[test]
    fn test_store_lookup_keeps_order() {
        let store = PersonaStore::new(vec![
            Persona::new("b", "Bee", ""),
            Persona::new("a", "Ay", ""),
        ])
        .unwrap();
        assert_eq!(store.get("a").unwrap().name, "Ay");
        assert!(store.get("c").is_none());
        let ids: Vec<_> = store.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_folder_keys_are_normalized() {
        let mappings = FolderMappings::new().with("/work//contracts/", &["legal"]);
        assert_eq!(
            mappings.get("work/contracts"),
            Some(&["legal".to_string()][..])
        );
        assert_eq!(normalize_folder(" ./notes\\drafts "), "notes/drafts");
    }

    #[test]
    fn test_folder_mappings_deserialize_from_table() {
        let json = serde_json::json!({ "work/": ["logic", "style"] });
        let mappings: FolderMappings = serde_json::from_value(json).unwrap();
        assert_eq!(mappings.get("work").unwrap().len(), 2);
    }
}
