//! Where a command is running: inside a deployment, inside a code location,
//! both, or neither.
//!
//! Detection walks from the working directory up through its ancestors and
//! reads the `[tool.dg]` table of each `pyproject.toml` it meets. The nearest
//! `is_code_location = true` marks the code location; the nearest
//! `is_deployment = true` marks the deployment and ends the walk.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{io_err, WorkspaceError};

pub const PYPROJECT_FILE: &str = "pyproject.toml";
pub const WORKSPACE_FILE: &str = "workspace.yaml";
pub const CODE_LOCATIONS_DIR: &str = "code_locations";

#[derive(Debug, Default, Deserialize)]
struct Pyproject {
    #[serde(default)]
    tool: Tool,
}

#[derive(Debug, Default, Deserialize)]
struct Tool {
    #[serde(default)]
    dg: DgTable,
}

/// The `[tool.dg]` table.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DgTable {
    #[serde(default)]
    pub is_deployment: bool,
    #[serde(default)]
    pub is_code_location: bool,
}

/// Read the `[tool.dg]` table of `dir/pyproject.toml`.
///
/// Returns `Ok(None)` when the directory has no `pyproject.toml`.
pub fn read_dg_table(dir: &Path) -> Result<Option<DgTable>, WorkspaceError> {
    let path = dir.join(PYPROJECT_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let parsed: Pyproject =
        toml::from_str(&contents).map_err(|e| WorkspaceError::Toml { path, source: e })?;
    Ok(Some(parsed.tool.dg))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DgContext {
    pub cwd: PathBuf,
    pub deployment_root: Option<PathBuf>,
    pub code_location_root: Option<PathBuf>,
}

impl DgContext {
    /// Detect the context for `cwd`.
    ///
    /// A `pyproject.toml` that fails to parse is logged and skipped, so a
    /// broken file in some unrelated ancestor does not block every command.
    pub fn discover_at(cwd: &Path) -> Self {
        let mut ctx = DgContext {
            cwd: cwd.to_path_buf(),
            deployment_root: None,
            code_location_root: None,
        };
        for dir in cwd.ancestors() {
            let table = match read_dg_table(dir) {
                Ok(Some(table)) => table,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), "ignoring unreadable pyproject: {e}");
                    continue;
                }
            };
            if table.is_code_location && ctx.code_location_root.is_none() {
                ctx.code_location_root = Some(dir.to_path_buf());
            }
            if table.is_deployment {
                ctx.deployment_root = Some(dir.to_path_buf());
                break;
            }
        }
        tracing::debug!(
            deployment = ?ctx.deployment_root,
            code_location = ?ctx.code_location_root,
            "detected context"
        );
        ctx
    }

    pub fn is_deployment(&self) -> bool {
        self.deployment_root.is_some()
    }

    pub fn is_code_location(&self) -> bool {
        self.code_location_root.is_some()
    }

    /// Deployment root, or [`WorkspaceError::NotInDeployment`].
    pub fn require_deployment(&self) -> Result<&Path, WorkspaceError> {
        self.deployment_root
            .as_deref()
            .ok_or_else(|| WorkspaceError::NotInDeployment { cwd: self.cwd.clone() })
    }

    pub fn code_locations_dir(&self) -> Option<PathBuf> {
        self.deployment_root.as_ref().map(|d| d.join(CODE_LOCATIONS_DIR))
    }

    pub fn workspace_file(&self) -> Option<PathBuf> {
        self.deployment_root.as_ref().map(|d| d.join(WORKSPACE_FILE))
    }
}

/// Names of the code locations in a deployment, sorted.
pub fn list_code_locations(ctx: &DgContext) -> Result<Vec<String>, WorkspaceError> {
    let root = ctx.require_deployment()?;
    let dir = root.join(CODE_LOCATIONS_DIR);
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(&dir).map_err(|e| io_err(&dir, e))? {
        let entry = entry.map_err(|e| io_err(&dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}
