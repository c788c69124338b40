//! Storage error types.
//!
//! These never cross the crate boundary as failures: the history store logs
//! them and degrades to empty results or no-ops.

use std::path::{Path, PathBuf};

use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file io error at {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize history for {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StorageError {
    pub fn file_io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileIo {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn serialize(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Serialize {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
