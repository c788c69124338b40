//! The context store: review history and chat history for one project.
//!
//! Everything here degrades instead of failing. A missing or corrupt file
//! reads as empty; a write error is logged and swallowed so a history
//! problem never costs the user their review result.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::warn;

use super::StorageResult;
use super::error::StorageError;
use crate::llm::{Message, StructuredReview};

/// FIFO cap on the stored review list.
pub const MAX_REVIEW_ENTRIES: usize = 50;
/// How many past reviews of a file are fed back to the model.
const REVIEW_CONTEXT_WINDOW: usize = 3;
/// Archived code snapshots are truncated to keep the history file small.
const MAX_ARCHIVED_CODE_CHARS: usize = 500;

/// One completed review, immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewEntry {
    pub file: String,
    pub timestamp: DateTime<Utc>,
    pub code: String,
    pub review: StructuredReview,
    pub score: u32,
}

/// Prior findings for a file, in the reduced shape the prompt embeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReviewContext {
    pub previous_reviews: Vec<ReviewSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSummary {
    pub timestamp: DateTime<Utc>,
    pub score: u32,
    pub summary: String,
}

/// JSON-backed history store scoped to one project directory.
pub struct ContextStore {
    history_dir: PathBuf,
    reviews_path: PathBuf,
    chat_path: PathBuf,
}

impl ContextStore {
    /// Point the store at a project root. Nothing is created until the
    /// first write.
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        let history_dir = project_root.as_ref().join(".revq").join("history");
        let reviews_path = history_dir.join("reviews.json");
        let chat_path = history_dir.join("chat.json");
        Self {
            history_dir,
            reviews_path,
            chat_path,
        }
    }

    /// The last [`REVIEW_CONTEXT_WINDOW`] reviews recorded for `file_path`,
    /// reduced to timestamp, score, and summary. Never fails outward.
    pub async fn review_context(&self, file_path: &str) -> ReviewContext {
        let entries = self.load_reviews().await;
        let matching: Vec<&ReviewEntry> =
            entries.iter().filter(|e| e.file == file_path).collect();
        let start = matching.len().saturating_sub(REVIEW_CONTEXT_WINDOW);

        ReviewContext {
            previous_reviews: matching[start..]
                .iter()
                .map(|entry| ReviewSummary {
                    timestamp: entry.timestamp,
                    score: entry.score,
                    summary: entry.review.summary.clone(),
                })
                .collect(),
        }
    }

    /// Append a review to the history, truncating the archived code and
    /// evicting the oldest entries past the cap. Write failures are logged
    /// and swallowed; the caller's review result must not depend on them.
    pub async fn record_review(&self, file_path: &str, code: &str, review: &StructuredReview) {
        let entry = ReviewEntry {
            file: file_path.to_string(),
            timestamp: Utc::now(),
            code: truncate_code(code),
            review: review.clone(),
            score: review.score,
        };

        let mut entries = self.load_reviews().await;
        entries.push(entry);
        if entries.len() > MAX_REVIEW_ENTRIES {
            entries.drain(..entries.len() - MAX_REVIEW_ENTRIES);
        }

        if let Err(e) = self.write_json(&self.reviews_path, &entries).await {
            warn!(file = file_path, error = %e, "failed to persist review history");
        }
    }

    /// The most recent reviews across all files, newest first.
    pub async fn recent_reviews(&self, limit: usize) -> Vec<ReviewEntry> {
        let mut entries = self.load_reviews().await;
        let start = entries.len().saturating_sub(limit);
        let mut recent = entries.split_off(start);
        recent.reverse();
        recent
    }

    /// The persisted conversation; missing or corrupt file reads as empty.
    pub async fn chat_history(&self) -> Vec<Message> {
        self.load_json(&self.chat_path).await
    }

    /// Persist the conversation verbatim. Errors are logged and swallowed.
    pub async fn save_chat_history(&self, messages: &[Message]) {
        if let Err(e) = self.write_json(&self.chat_path, &messages).await {
            warn!(error = %e, "failed to persist chat history");
        }
    }

    /// Reset both histories to empty arrays. Idempotent.
    pub async fn clear_history(&self) {
        for path in [&self.reviews_path, &self.chat_path] {
            if let Err(e) = self
                .write_json(path, &Vec::<serde_json::Value>::new())
                .await
            {
                warn!(path = %path.display(), error = %e, "failed to clear history");
            }
        }
    }

    async fn load_reviews(&self) -> Vec<ReviewEntry> {
        self.load_json(&self.reviews_path).await
    }

    async fn load_json<T>(&self, path: &Path) -> Vec<T>
    where
        T: serde::de::DeserializeOwned,
    {
        match fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    async fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> StorageResult<()> {
        fs::create_dir_all(&self.history_dir)
            .await
            .map_err(|e| StorageError::file_io(&self.history_dir, e))?;
        let data =
            serde_json::to_vec_pretty(value).map_err(|e| StorageError::serialize(path, e))?;
        super::atomic_write_file(path, &data).await
    }
}

fn truncate_code(code: &str) -> String {
    if code.chars().count() <= MAX_ARCHIVED_CODE_CHARS {
        return code.to_string();
    }
    let mut truncated: String = code.chars().take(MAX_ARCHIVED_CODE_CHARS).collect();
    truncated.push_str("...");
    truncated
}
