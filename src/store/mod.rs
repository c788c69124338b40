//! Per-project history storage.
//!
//! Review and chat histories live as JSON array files under the project's
//! hidden `.revq/history/` directory. Every write replaces the whole array
//! through a temp-file + rename so a killed process never leaves a partially
//! written file behind.

use std::path::Path;

use tokio::fs;
use tokio::io::AsyncWriteExt;

mod error;
mod history;

pub use error::{StorageError, StorageResult};
pub use history::{
    ContextStore, MAX_REVIEW_ENTRIES, ReviewContext, ReviewEntry, ReviewSummary,
};

/// Write data to a temp file, fsync it, then atomically rename to the final
/// path.
///
/// The temp file name carries a ULID so concurrent writers targeting the
/// same final path cannot collide.
async fn atomic_write_file(final_path: &Path, data: &[u8]) -> StorageResult<()> {
    let file_name = final_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let temp_path = final_path.with_file_name(format!("{}.{}.tmp", file_name, ulid::Ulid::new()));

    let mut file = fs::File::create(&temp_path)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    file.write_all(data)
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    file.sync_all()
        .await
        .map_err(|e| StorageError::file_io(&temp_path, e))?;
    fs::rename(&temp_path, final_path)
        .await
        .map_err(|e| StorageError::file_io(final_path, e))?;
    Ok(())
}
