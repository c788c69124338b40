//! Version-control collaborator.
//!
//! The orchestrator only needs two things from git: a per-file diff to keep
//! review prompts small, and the staged file list. Both shell out via
//! `tokio::process::Command`; an environment without git simply falls back
//! to full-file reviews.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Io(#[from] std::io::Error),

    #[error("git exited with status {status}: {stderr}")]
    Command { status: i32, stderr: String },
}

#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Unstaged diff for one file. Empty output means no targeted change,
    /// which callers treat as "review the full file".
    async fn diff(&self, path: &Path) -> Result<String, GitError>;

    /// Paths currently in the staging area.
    async fn staged(&self) -> Result<Vec<PathBuf>, GitError>;
}

/// `git` CLI implementation rooted at one working directory.
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn run(&self, args: &[&str]) -> Result<String, GitError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .output()
            .await?;

        if !output.status.success() {
            return Err(GitError::Command {
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn diff(&self, path: &Path) -> Result<String, GitError> {
        let path_arg = path.to_string_lossy();
        self.run(&["diff", "--", path_arg.as_ref()]).await
    }

    async fn staged(&self) -> Result<Vec<PathBuf>, GitError> {
        let output = self.run(&["diff", "--name-only", "--cached"]).await?;
        Ok(output
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect())
    }
}
