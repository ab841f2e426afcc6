//! Atomic file writes for the persisted store.

use docqa_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `bytes` to `path` through a sibling temp file and a rename, so a
/// reader never observes a partially written file.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> AppResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| {
                AppError::Store(format!("Failed to create directory {:?}: {}", parent, e))
            })?;
        }
    }

    let tmp_path = tmp_path_for(path);
    fs::write(&tmp_path, bytes)
        .map_err(|e| AppError::Store(format!("Failed to write {:?}: {}", tmp_path, e)))?;

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(AppError::Store(format!(
            "Failed to move {:?} into place: {}",
            path, e
        )));
    }

    Ok(())
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
