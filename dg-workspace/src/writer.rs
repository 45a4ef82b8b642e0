//! Atomic file writer.
//!
//! Every file `dg` produces goes through [`atomic_write`]:
//!
//! 1. Normalise line endings to LF.
//! 2. Ensure the parent directory exists.
//! 3. Write to `<path>.dg.tmp` in the same directory.
//! 4. Rename to the final path (atomic on POSIX).

use std::path::{Path, PathBuf};

use crate::error::{io_err, WorkspaceError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// Existing file already held exactly this content.
    Unchanged { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path } | WriteResult::Unchanged { path } => path,
        }
    }
}

pub(crate) fn tmp_path_for(path: &Path) -> PathBuf {
    PathBuf::from(format!("{}.dg.tmp", path.display()))
}

/// Atomically write `content` to `path`.
pub fn atomic_write(path: &Path, content: &str) -> Result<WriteResult, WorkspaceError> {
    let normalized = content.replace("\r\n", "\n");

    if let Ok(existing) = std::fs::read_to_string(path) {
        if existing == normalized {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged { path: path.to_path_buf() });
        }
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }

    let tmp = tmp_path_for(path);
    std::fs::write(&tmp, &normalized).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }

    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written { path: path.to_path_buf() })
}
