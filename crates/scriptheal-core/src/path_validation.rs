//! Work directory validation.
//!
//! A work dir must exist, be a directory, and (when SCRIPTHEAL_WORK_ROOT is set)
//! stay within that root after symlink resolution.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkDirError {
    #[error("work directory does not exist: {0}")]
    NotFound(PathBuf),

    #[error("work directory is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("work directory {path} escapes allowed root {root}")]
    EscapesRoot { path: PathBuf, root: PathBuf },

    #[error("invalid SCRIPTHEAL_WORK_ROOT {root}: {source}")]
    InvalidRoot {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Get the configured root, canonicalized. `Ok(None)` when unrestricted.
pub fn get_allowed_root() -> Result<Option<PathBuf>, WorkDirError> {
    let Some(root) = crate::config::PathsConfig::from_env().work_root else {
        return Ok(None);
    };
    let root = PathBuf::from(root);
    root.canonicalize()
        .map(Some)
        .map_err(|source| WorkDirError::InvalidRoot { root, source })
}

/// Validate `path` is an existing directory under `allowed_root` (if any).
/// Returns the canonical path.
pub fn validate_work_dir_under(
    path: &Path,
    allowed_root: Option<&Path>,
) -> Result<PathBuf, WorkDirError> {
    let canonical = path
        .canonicalize()
        .map_err(|_| WorkDirError::NotFound(path.to_path_buf()))?;
    if !canonical.is_dir() {
        return Err(WorkDirError::NotADirectory(path.to_path_buf()));
    }
    if let Some(root) = allowed_root {
        if !canonical.starts_with(root) {
            return Err(WorkDirError::EscapesRoot {
                path: path.to_path_buf(),
                root: root.to_path_buf(),
            });
        }
    }
    Ok(canonical)
}

/// Validate a work dir against the configured root.
pub fn validate_work_dir(path: &Path) -> Result<PathBuf, WorkDirError> {
    let root = get_allowed_root()?;
    validate_work_dir_under(path, root.as_deref())
}
