//! Pin dagster packages to a local checkout via `[tool.uv.sources]`.

use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::config::DgConfig;
use crate::error::{io_err, WorkspaceError};

/// Packages pinned from `python_modules/` directly.
pub const CORE_EDITABLE_PACKAGES: &[&str] = &["dagster", "dagster-pipes", "dagster-webserver"];

/// How `--use-editable-dagster` was given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditableDagster {
    /// Flag absent.
    Off,
    /// Flag given without a path (or with `--`): read `DAGSTER_GIT_REPO_DIR`.
    FromEnv,
    /// Flag given with an explicit repo root.
    Path(PathBuf),
}

impl EditableDagster {
    /// Resolve to an absolute repo root, or `None` when editable pinning is off.
    ///
    /// uv reads pinned paths relative to the code location, so a relative
    /// root is resolved against the cwd here.
    pub fn resolve(&self, config: &DgConfig) -> Result<Option<PathBuf>, WorkspaceError> {
        let root = match self {
            EditableDagster::Off => return Ok(None),
            EditableDagster::FromEnv => config
                .dagster_git_repo_dir
                .clone()
                .ok_or(WorkspaceError::EditableRepoMissing)?,
            EditableDagster::Path(p) => p.clone(),
        };
        if !root.join("python_modules").is_dir() {
            return Err(WorkspaceError::InvalidEditableRepo { path: root });
        }
        let root = root.canonicalize().map_err(|e| io_err(&root, e))?;
        Ok(Some(root))
    }
}

/// One pinned package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditableSource {
    pub package: String,
    pub path: PathBuf,
}

/// Every package to pin from the checkout at `repo_root`: the core packages
/// plus each directory under `python_modules/libraries/`, sorted by name.
pub fn editable_sources(repo_root: &Path) -> Result<Vec<EditableSource>, WorkspaceError> {
    let modules = repo_root.join("python_modules");
    let mut sources: Vec<EditableSource> = CORE_EDITABLE_PACKAGES
        .iter()
        .map(|name| EditableSource {
            package: name.to_string(),
            path: modules.join(name),
        })
        .collect();

    let libraries = modules.join("libraries");
    if libraries.is_dir() {
        let mut libs = Vec::new();
        for entry in std::fs::read_dir(&libraries).map_err(|e| io_err(&libraries, e))? {
            let entry = entry.map_err(|e| io_err(&libraries, e))?;
            if entry.path().is_dir() {
                libs.push(EditableSource {
                    package: entry.file_name().to_string_lossy().into_owned(),
                    path: entry.path(),
                });
            }
        }
        libs.sort_by(|a, b| a.package.cmp(&b.package));
        sources.extend(libs);
    }
    Ok(sources)
}

/// Add `sources` to `[tool.uv.sources]` of the pyproject text `content`.
pub fn apply_editable_sources(
    content: &str,
    manifest_path: &Path,
    sources: &[EditableSource],
) -> Result<String, WorkspaceError> {
    let mut doc: Table = content.parse().map_err(|e| WorkspaceError::Toml {
        path: manifest_path.to_path_buf(),
        source: e,
    })?;

    let mut tool = take_table(&mut doc, "tool");
    let mut uv = take_table(&mut tool, "uv");
    let mut uv_sources = take_table(&mut uv, "sources");
    for source in sources {
        let mut entry = Table::new();
        entry.insert(
            "path".to_string(),
            Value::String(source.path.to_string_lossy().into_owned()),
        );
        entry.insert("editable".to_string(), Value::Boolean(true));
        uv_sources.insert(source.package.clone(), Value::Table(entry));
    }
    uv.insert("sources".to_string(), Value::Table(uv_sources));
    tool.insert("uv".to_string(), Value::Table(uv));
    doc.insert("tool".to_string(), Value::Table(tool));

    Ok(toml::to_string(&doc)?)
}

/// Remove `key` from `table` as a table; a missing or non-table value yields an empty one.
fn take_table(table: &mut Table, key: &str) -> Table {
    match table.remove(key) {
        Some(Value::Table(t)) => t,
        _ => Table::new(),
    }
}
