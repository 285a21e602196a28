//! Advisory notices surfaced to the user during a review.
//!
//! Notices are not part of the data model; they carry only a persona name
//! and a short message.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    NoPersonasConfigured,
    NoBackendConfigured,
    ReviewStarted { persona_count: usize },
    PersonaFailed { persona_name: String, message: String },
    ReviewFailed { message: String },
    ArtifactSaved { path: String },
}

impl Notice {
    /// Whether the notice reports something that went wrong.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::ReviewStarted { .. } | Self::ArtifactSaved { .. })
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoPersonasConfigured => {
                write!(f, "No personas defined. Please add at least one in settings.")
            }
            Notice::NoBackendConfigured => write!(f, "No LLM provider configured correctly."),
            Notice::ReviewStarted { persona_count } => {
                write!(f, "Running review with {persona_count} personas...")
            }
            Notice::PersonaFailed {
                persona_name,
                message,
            } => write!(f, "Error from persona {persona_name}: {message}"),
            Notice::ReviewFailed { message } => write!(f, "Review failed: {message}"),
            Notice::ArtifactSaved { path } => write!(f, "Review saved to {path}"),
        }
    }
}

/// Receives notices. Implementations must not block.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Discards every notice.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _notice: Notice) {}
}
