//! Per-location Python environments.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::WorkspaceError;

pub const VENV_DIR: &str = ".venv";
pub const LOCK_FILE: &str = "uv.lock";

/// Creates the environment of a freshly scaffolded code location.
pub trait EnvironmentProvisioner {
    fn provision(&self, location_root: &Path) -> Result<(), WorkspaceError>;
}

/// Runs `uv sync` in the location directory, producing `.venv/` and `uv.lock`.
#[derive(Debug, Clone)]
pub struct UvProvisioner {
    bin: String,
}

impl UvProvisioner {
    pub fn new(bin: impl Into<String>) -> Self {
        UvProvisioner { bin: bin.into() }
    }
}

impl EnvironmentProvisioner for UvProvisioner {
    fn provision(&self, location_root: &Path) -> Result<(), WorkspaceError> {
        tracing::info!(bin = %self.bin, "running uv sync in {}", location_root.display());
        let output = Command::new(&self.bin)
            .arg("sync")
            .current_dir(location_root)
            .output()
            .map_err(|e| WorkspaceError::Provision {
                dir: location_root.to_path_buf(),
                message: format!("could not run `{} sync`: {e}", self.bin),
            })?;
        if !output.status.success() {
            return Err(WorkspaceError::Provision {
                dir: location_root.to_path_buf(),
                message: format!(
                    "`{} sync` exited with {}: {}",
                    self.bin,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }
        if !has_environment(location_root) {
            return Err(WorkspaceError::Provision {
                dir: location_root.to_path_buf(),
                message: format!("`{} sync` succeeded but created no {VENV_DIR}/", self.bin),
            });
        }
        Ok(())
    }
}

/// Interpreter inside the environment, relative to the location root.
pub fn venv_python_relative() -> PathBuf {
    if cfg!(windows) {
        Path::new(VENV_DIR).join("Scripts").join("python.exe")
    } else {
        Path::new(VENV_DIR).join("bin").join("python")
    }
}

/// Whether `location_root` has a provisioned environment.
pub fn has_environment(location_root: &Path) -> bool {
    location_root.join(VENV_DIR).is_dir()
}
