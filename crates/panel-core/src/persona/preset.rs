//! Default persona presets.
//!
//! Written into a fresh `config.toml` by `panel init` so a first review has
//! reviewers to run.

use super::model::Persona;

/// Returns the starter reviewer personas.
///
/// - **Logic Critic**: argument structure, unsupported claims, contradictions
/// - **Style Editor**: clarity, concision and tone
pub fn get_default_presets() -> Vec<Persona> {
    vec![
        Persona {
            id: "logic-critic".to_string(),
            name: "Logic Critic".to_string(),
            instructions: "You are a rigorous logic critic. Identify unsupported claims, gaps in reasoning, contradictions and ambiguous definitions. Be specific and constructive.".to_string(),
        },
        Persona {
            id: "style-editor".to_string(),
            name: "Style Editor".to_string(),
            instructions: "You are a senior copy editor. Point out passive voice, filler, jargon and sentences that could be shorter or clearer. Preserve the author's voice.".to_string(),
        },
    ]
}
