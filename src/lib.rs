//! revq - AI code review core.
//!
//! Routes review and chat requests to one of three LLM backends, falls back
//! to substitute models when a quota cap is hit, and keeps a small
//! per-project history so the AI remembers past findings.
//!
//! The CLI surface, setup wizard, file watcher, and terminal rendering live
//! outside this crate and reach the core through the [`engine::Render`] and
//! [`git::VersionControl`] traits.

pub mod config;
pub mod engine;
pub mod git;
pub mod llm;
pub mod prompt;
pub mod store;

pub use config::Config;
pub use engine::{Engine, EngineError, Render};
pub use git::{GitCli, VersionControl};
pub use llm::{LLMError, Message, Provider, ProviderRouter, Role, StructuredReview};
pub use store::{ContextStore, ReviewContext, ReviewEntry, ReviewSummary};
