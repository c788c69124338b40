//! Review/chat orchestration.
//!
//! The engine composes the prompt builder, context store, and provider
//! router into the two user-facing operations: review one file and continue
//! a chat. It owns the sliding-window trimming of chat history. Rendering
//! and version control stay behind the [`Render`] and
//! [`crate::git::VersionControl`] traits so the CLI, watcher, and terminal
//! UI can drive it without the core knowing about them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::fs;
use tracing::{debug, warn};

use crate::git::{GitError, VersionControl};
use crate::llm::{LLMError, Message, ProviderRouter, StructuredReview};
use crate::store::ContextStore;

/// Sliding window over the persisted conversation.
pub const MAX_CHAT_MESSAGES: usize = 20;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Llm(#[from] LLMError),
}

/// Display collaborator. The core hands over results; rendering them is
/// someone else's problem.
pub trait Render: Send + Sync {
    fn review(&self, file: &Path, review: &StructuredReview);
    fn chat_reply(&self, reply: &str);
}

pub struct Engine {
    router: ProviderRouter,
    store: ContextStore,
    vcs: Arc<dyn VersionControl>,
    render: Arc<dyn Render>,
    include_context: bool,
}

impl Engine {
    pub fn new(
        router: ProviderRouter,
        store: ContextStore,
        vcs: Arc<dyn VersionControl>,
        render: Arc<dyn Render>,
        include_context: bool,
    ) -> Self {
        Self {
            router,
            store,
            vcs,
            render,
            include_context,
        }
    }

    /// Build an engine for a project directory from its configuration.
    pub fn from_config(
        config: &crate::config::Config,
        project_root: impl AsRef<Path>,
        vcs: Arc<dyn VersionControl>,
        render: Arc<dyn Render>,
    ) -> Result<Self, LLMError> {
        Ok(Self::new(
            ProviderRouter::from_config(config)?,
            ContextStore::new(project_root),
            vcs,
            render,
            config.include_context,
        ))
    }

    /// Review one file: diff when available, full content otherwise. The
    /// result goes to the renderer and into the history archive (which
    /// always stores the full content, never the diff).
    pub async fn review_file(&self, file_path: &Path) -> Result<StructuredReview, EngineError> {
        let code = match fs::read_to_string(file_path).await {
            Ok(code) => code,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(EngineError::FileNotFound(file_path.to_path_buf()));
            }
            Err(e) => {
                return Err(EngineError::Read {
                    path: file_path.to_path_buf(),
                    source: e,
                });
            }
        };

        // Prefer the diff so the model only sees what changed; an untracked
        // or unchanged file falls back to the full content.
        let diff = match self.vcs.diff(file_path).await {
            Ok(diff) => diff,
            Err(e) => {
                debug!(error = %e, "git diff unavailable, reviewing full file");
                String::new()
            }
        };
        let subject = if diff.trim().is_empty() { &code } else { &diff };

        let file_name = file_path.to_string_lossy();
        let context = if self.include_context {
            Some(self.store.review_context(&file_name).await)
        } else {
            None
        };

        let review = self
            .router
            .review_code(subject, &file_name, context.as_ref())
            .await?;

        self.render.review(file_path, &review);
        self.store.record_review(&file_name, &code, &review).await;
        Ok(review)
    }

    /// Review every staged file sequentially, logging and skipping per-file
    /// failures. Returns how many reviews completed.
    pub async fn review_staged(&self) -> Result<usize, EngineError> {
        let staged = self.vcs.staged().await?;
        let mut reviewed = 0;
        for file in &staged {
            match self.review_file(file).await {
                Ok(_) => reviewed += 1,
                Err(e) => warn!(file = %file.display(), error = %e, "staged review failed"),
            }
        }
        Ok(reviewed)
    }

    /// One chat exchange: route the message with the persisted history,
    /// append both turns, trim to the sliding window, persist. A history
    /// write failure never loses the reply.
    pub async fn chat(&self, message: &str) -> Result<String, EngineError> {
        let mut history = self.store.chat_history().await;
        let reply = self.router.chat(message, &history).await?;

        self.render.chat_reply(&reply);

        history.push(Message::user(message));
        history.push(Message::assistant(&reply));
        if history.len() > MAX_CHAT_MESSAGES {
            history.drain(..history.len() - MAX_CHAT_MESSAGES);
        }
        self.store.save_chat_history(&history).await;
        Ok(reply)
    }

    /// Wipe both histories for this project.
    pub async fn clear_history(&self) {
        self.store.clear_history().await;
    }
}
