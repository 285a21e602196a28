//! Application layer for Panel.
//!
//! Use cases that coordinate the review core with generation backends,
//! document storage and user notices.

pub mod review_orchestrator;
pub mod review_usecase;
pub mod synthesis_engine;

pub use review_orchestrator::{CollectedFeedback, ReviewOrchestrator, ReviewOutcome};
pub use review_usecase::{REVIEW_METADATA_KEY, ReviewReport, ReviewUseCase, relocate_excerpts};
pub use synthesis_engine::SynthesisEngine;
