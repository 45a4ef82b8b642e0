//! `workspace.yaml`: the list of code locations a deployment loads.
//!
//! ```yaml
//! load_from:
//!   - python_file:
//!       relative_path: code_locations/foo-bar/foo_bar/definitions.py
//!       location_name: foo-bar
//!       executable_path: code_locations/foo-bar/.venv/bin/python
//! ```
//!
//! Load targets of kinds other than `python_file` are kept as-is on rewrite.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{io_err, WorkspaceError};
use crate::writer::atomic_write;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkspaceFile {
    #[serde(default)]
    pub load_from: Vec<LoadTarget>,
}

/// One `load_from` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadTarget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub python_file: Option<PythonFileTarget>,
    #[serde(flatten)]
    pub other: BTreeMap<String, serde_yaml::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythonFileTarget {
    pub relative_path: String,
    pub location_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executable_path: Option<String>,
}

impl LoadTarget {
    pub fn python_file(target: PythonFileTarget) -> Self {
        LoadTarget {
            python_file: Some(target),
            other: BTreeMap::new(),
        }
    }

    pub fn location_name(&self) -> Option<&str> {
        self.python_file.as_ref().map(|p| p.location_name.as_str())
    }
}

/// Load `path`. An empty file reads as an empty workspace.
pub fn load(path: &Path) -> Result<WorkspaceFile, WorkspaceError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(WorkspaceFile::default());
    }
    serde_yaml::from_str(&contents).map_err(|e| WorkspaceError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Save `workspace` to `path` atomically.
pub fn save(path: &Path, workspace: &WorkspaceFile) -> Result<(), WorkspaceError> {
    let yaml = serde_yaml::to_string(workspace).map_err(|e| WorkspaceError::Yaml {
        path: path.to_path_buf(),
        source: e,
    })?;
    atomic_write(path, &yaml)?;
    Ok(())
}

/// Append `target` to the workspace file at `path`, replacing any existing
/// entry with the same location name.
pub fn register(path: &Path, target: PythonFileTarget) -> Result<(), WorkspaceError> {
    let mut workspace = load(path)?;
    let name = target.location_name.clone();
    workspace
        .load_from
        .retain(|t| t.location_name() != Some(name.as_str()));
    workspace.load_from.push(LoadTarget::python_file(target));
    save(path, &workspace)?;
    tracing::info!(location = %name, "registered code location in {}", path.display());
    Ok(())
}
