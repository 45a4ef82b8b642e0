//! Error types for dg-workspace.

use std::path::PathBuf;

use thiserror::Error;

use dg_components::DiscoveryError;
use dg_renderer::RenderError;

/// All errors that can arise from workspace operations.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `workspace.yaml` could not be parsed or serialized.
    #[error("invalid workspace file at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A `pyproject.toml` could not be parsed.
    #[error("invalid TOML at {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Listing cache (de)serialization error.
    #[error("cache JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Project name unusable as a directory or package name.
    #[error("invalid name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// Scaffold target is already present.
    #[error("{kind} already exists at {}", path.display())]
    AlreadyExists { kind: &'static str, path: PathBuf },

    #[error("this command must be run inside a Dagster deployment directory (searched from {})", cwd.display())]
    NotInDeployment { cwd: PathBuf },

    #[error("--use-editable-dagster without a path requires the `DAGSTER_GIT_REPO_DIR` environment variable to be set")]
    EditableRepoMissing,

    /// The editable repo root does not look like a dagster checkout.
    #[error("{} is not a dagster repository: no python_modules directory", path.display())]
    InvalidEditableRepo { path: PathBuf },

    #[error("environment provisioning failed in {}: {message}", dir.display())]
    Provision { dir: PathBuf, message: String },

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

/// Convenience constructor for [`WorkspaceError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> WorkspaceError {
    WorkspaceError::Io {
        path: path.into(),
        source,
    }
}
