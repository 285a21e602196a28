//! Panel core: domain types and the pure parts of a multi-persona review.
//!
//! Nothing in this crate performs I/O. Storage, generation and notices are
//! reached through the capability traits in [`storage`], [`generation`] and
//! [`notification`].

pub mod config;
pub mod error;
pub mod generation;
pub mod notification;
pub mod persona;
pub mod review;
pub mod storage;

// Re-export common types
pub use error::{PanelError, Result};
pub use generation::{GenerationBackend, GenerationError, GenerationResponse, TokenUsage};
pub use notification::{Notice, Notifier};
