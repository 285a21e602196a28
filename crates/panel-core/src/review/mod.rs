//! Review domain module.
//!
//! # Module Structure
//!
//! - `model`: `Comment`, `ReviewResult` and per-persona failure records
//! - `parser`: free-text generation output to candidate feedback lines
//! - `locator`: anchoring quoted excerpts in the reviewed document
//! - `codec`: the persisted review artifact layout (write and re-read)

pub mod codec;
pub mod locator;
mod model;
pub mod parser;

pub use codec::{ReviewArtifactHeader, artifact_file_name, deserialize_review, serialize_review};
pub use locator::{LocatedExcerpt, locate, offset_to_position};
pub use model::{
    Comment, NO_FEEDBACK_SYNTHESIS, PersonaFailure, ReviewResult, SYNTHESIS_FAILED,
};
pub use parser::{ParsedLine, parse};

/// Builds the comments for one persona's raw output.
///
/// Runs the output parser and anchors each quoted excerpt in `document`.
pub fn comments_from_output(persona_name: &str, raw_output: &str, document: &str) -> Vec<Comment> {
    parse(raw_output)
        .into_iter()
        .map(|line| match line.raw_excerpt {
            Some(raw) => {
                let located = locate(&raw, document);
                Comment {
                    persona_name: persona_name.to_string(),
                    text: line.text,
                    excerpt: Some(located.excerpt),
                    start: located.start,
                    end: located.end,
                }
            }
            None => Comment::new(persona_name, line.text),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOCUMENT: &str = "This is the specific quote and the second quote here.";

    #[test]
    fn test_bullets_become_anchored_comments() {
        let raw = "- Actionable feedback \"specific quote\"\n* Another point \"second quote\"";

        let comments = comments_from_output("Logic Critic", raw, DOCUMENT);

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].persona_name, "Logic Critic");
        assert_eq!(comments[0].text, "Actionable feedback \"specific quote\"");
        assert_eq!(comments[0].excerpt.as_deref(), Some("specific quote"));
        assert_eq!(comments[0].start, Some(12));
        assert_eq!(comments[0].end, Some(26));
        assert_eq!(comments[1].excerpt.as_deref(), Some("second quote"));
        assert_eq!(comments[1].start, Some(35));
    }

    #[test]
    fn test_case_insensitive_anchor_adopts_source_casing() {
        let comments = comments_from_output("Critic", "- Feedback \"SPECIFIC QUOTE\"", DOCUMENT);

        assert_eq!(comments[0].excerpt.as_deref(), Some("specific quote"));
        assert_eq!(comments[0].start, Some(12));
    }

    #[test]
    fn test_unmatched_excerpt_keeps_raw_text() {
        let comments = comments_from_output("Critic", "- Odd \"not in the document\"", DOCUMENT);

        assert_eq!(comments[0].excerpt.as_deref(), Some("not in the document"));
        assert_eq!(comments[0].start, None);
        assert_eq!(comments[0].end, None);
    }

    #[test]
    fn test_line_without_quote_has_no_excerpt() {
        let comments = comments_from_output("Critic", "- General tone is fine", DOCUMENT);

        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].excerpt, None);
    }
}
