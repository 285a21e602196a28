use serde::{Deserialize, Serialize};

/// Synthesis value when no persona produced any feedback.
pub const NO_FEEDBACK_SYNTHESIS: &str = "No feedback to summarize.";

/// Synthesis value when the synthesis call failed.
pub const SYNTHESIS_FAILED: &str =
    "Meta-review synthesis failed. Please check individual feedback.";

/// One structured feedback item.
///
/// `text` is the full feedback line with the quote still embedded. `start`
/// and `end` are character offsets into the reviewed document (end
/// exclusive) and are only present when the excerpt was found there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub persona_name: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<usize>,
}

impl Comment {
    /// A comment without an excerpt.
    pub fn new(persona_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            persona_name: persona_name.into(),
            text: text.into(),
            excerpt: None,
            start: None,
            end: None,
        }
    }

    pub fn with_excerpt(mut self, excerpt: impl Into<String>) -> Self {
        self.excerpt = Some(excerpt.into());
        self
    }

    pub fn is_located(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// The outcome of one review run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub comments: Vec<Comment>,
    pub synthesis: String,
}

impl ReviewResult {
    /// Persona names in first-appearance order among the comments.
    pub fn persona_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for comment in &self.comments {
            if !names.contains(&comment.persona_name.as_str()) {
                names.push(&comment.persona_name);
            }
        }
        names
    }

    /// Comments of one persona, in their original order.
    pub fn comments_by<'a>(&'a self, persona_name: &'a str) -> impl Iterator<Item = &'a Comment> {
        self.comments
            .iter()
            .filter(move |c| c.persona_name == persona_name)
    }
}

/// A persona whose generation call failed during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaFailure {
    pub persona_name: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_names_in_first_appearance_order() {
        let result = ReviewResult {
            comments: vec![
                Comment::new("Style Editor", "a"),
                Comment::new("Logic Critic", "b"),
                Comment::new("Style Editor", "c"),
            ],
            synthesis: String::new(),
        };

        assert_eq!(result.persona_names(), vec!["Style Editor", "Logic Critic"]);
        let texts: Vec<_> = result.comments_by("Style Editor").map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }
}
