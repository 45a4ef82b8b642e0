//! Creating deployments and code locations on disk.
//!
//! Both operations check every precondition (target absent, name usable,
//! editable checkout resolvable) before the first file is written, so a
//! failed scaffold leaves the filesystem untouched.

use std::path::{Path, PathBuf};

use dg_renderer::{module_name_for, Renderer, ScaffoldContext, TemplateKind};

use crate::cache::CacheStatus;
use crate::config::DgConfig;
use crate::context::{DgContext, CODE_LOCATIONS_DIR, PYPROJECT_FILE};
use crate::editable::{apply_editable_sources, editable_sources, EditableDagster};
use crate::error::{io_err, WorkspaceError};
use crate::listing::list_component_types;
use crate::provision::{venv_python_relative, EnvironmentProvisioner};
use crate::workspace_file::{self, PythonFileTarget};
use crate::writer::{atomic_write, WriteResult};

// ---------------------------------------------------------------------------
// Options and reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeLocationOptions {
    pub editable: EditableDagster,
    pub skip_venv: bool,
    /// `false` for `--no-use-dg-managed-environment`.
    pub use_dg_managed_environment: bool,
}

impl Default for CodeLocationOptions {
    fn default() -> Self {
        CodeLocationOptions {
            editable: EditableDagster::Off,
            skip_venv: false,
            use_dg_managed_environment: true,
        }
    }
}

impl CodeLocationOptions {
    pub fn provisions_environment(&self) -> bool {
        !self.skip_venv && self.use_dg_managed_environment
    }
}

/// What happened to `workspace.yaml` during a code location scaffold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    Registered { workspace_file: PathBuf },
    /// Inside a deployment that has no workspace file.
    MissingWorkspaceFile { expected: PathBuf },
    /// Scaffolded outside any deployment.
    Standalone,
}

#[derive(Debug, Clone)]
pub struct CodeLocationReport {
    pub name: String,
    pub root: PathBuf,
    pub files: Vec<WriteResult>,
    pub provisioned: bool,
    pub registration: Registration,
    /// Listing cache status after population; `None` when nothing was provisioned.
    pub cache: Option<CacheStatus>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_name(name: &str) -> Result<(), WorkspaceError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains(['/', '\\']) {
        Some("name must not contain path separators")
    } else if name == "." || name == ".." {
        Some("name must not be a relative path component")
    } else if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Some("use only ASCII letters, digits, '-' and '_'")
    } else if name.starts_with(|c: char| c.is_ascii_digit()) {
        Some("name must not start with a digit")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(WorkspaceError::InvalidName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn write_outputs(
    outputs: Vec<(PathBuf, String)>,
    dirs: Vec<PathBuf>,
) -> Result<Vec<WriteResult>, WorkspaceError> {
    let mut files = Vec::with_capacity(outputs.len());
    for (path, content) in outputs {
        files.push(atomic_write(&path, &content)?);
    }
    for dir in dirs {
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
    }
    Ok(files)
}

fn renderer(config: &DgConfig) -> Result<Renderer, WorkspaceError> {
    Ok(match &config.template_dir {
        Some(dir) => Renderer::with_overrides(dir)?,
        None => Renderer::new()?,
    })
}

fn slash_join(parts: &[&str]) -> String {
    parts.join("/")
}

// ---------------------------------------------------------------------------
// scaffold_deployment
// ---------------------------------------------------------------------------

/// Create deployment `name` under `parent`.
pub fn scaffold_deployment(
    parent: &Path,
    name: &str,
    config: &DgConfig,
) -> Result<Vec<WriteResult>, WorkspaceError> {
    validate_name(name)?;
    let root = parent.join(name);
    if root.exists() {
        return Err(WorkspaceError::AlreadyExists {
            kind: "deployment",
            path: root,
        });
    }

    let renderer = renderer(config)?;
    let ctx = ScaffoldContext::new(name, &root);
    let outputs = renderer.render_with_context(&ctx, TemplateKind::Deployment)?;
    let files = write_outputs(
        outputs,
        TemplateKind::Deployment.extra_dirs(&root, &ctx.module_name),
    )?;
    tracing::info!(deployment = %name, "scaffolded deployment at {}", root.display());
    Ok(files)
}

// ---------------------------------------------------------------------------
// scaffold_code_location
// ---------------------------------------------------------------------------

/// Create code location `name`.
///
/// Inside a deployment it goes to `code_locations/<name>` and is registered in
/// `workspace.yaml`; elsewhere it goes to `<cwd>/<name>`.
pub fn scaffold_code_location(
    ctx: &DgContext,
    name: &str,
    options: &CodeLocationOptions,
    config: &DgConfig,
    provisioner: &dyn EnvironmentProvisioner,
) -> Result<CodeLocationReport, WorkspaceError> {
    validate_name(name)?;
    let parent = ctx.code_locations_dir().unwrap_or_else(|| ctx.cwd.clone());
    let root = parent.join(name);
    if root.exists() {
        return Err(WorkspaceError::AlreadyExists {
            kind: "code location",
            path: root,
        });
    }

    let editable_root = options.editable.resolve(config)?;
    let sources = match editable_root.as_deref() {
        Some(repo) => editable_sources(repo)?,
        None => vec![],
    };

    let renderer = renderer(config)?;
    let scaffold_ctx = ScaffoldContext::new(name, &root);
    let mut outputs = renderer.render_with_context(&scaffold_ctx, TemplateKind::CodeLocation)?;
    if !sources.is_empty() {
        let manifest = root.join(PYPROJECT_FILE);
        for (path, content) in outputs.iter_mut() {
            if *path == manifest {
                *content = apply_editable_sources(content, path, &sources)?;
            }
        }
    }
    let files = write_outputs(
        outputs,
        TemplateKind::CodeLocation.extra_dirs(&root, &scaffold_ctx.module_name),
    )?;
    tracing::info!(location = %name, "scaffolded code location at {}", root.display());

    let provisioned = options.provisions_environment();
    if provisioned {
        provisioner.provision(&root)?;
    }

    let registration = match ctx.workspace_file() {
        None => Registration::Standalone,
        Some(path) if !path.is_file() => {
            tracing::warn!("no workspace file at {}; skipping registration", path.display());
            Registration::MissingWorkspaceFile { expected: path }
        }
        Some(path) => {
            let module = module_name_for(name);
            let python = venv_python_relative().to_string_lossy().replace('\\', "/");
            workspace_file::register(
                &path,
                PythonFileTarget {
                    relative_path: slash_join(&[
                        CODE_LOCATIONS_DIR,
                        name,
                        &module,
                        "definitions.py",
                    ]),
                    location_name: name.to_string(),
                    executable_path: provisioned
                        .then(|| slash_join(&[CODE_LOCATIONS_DIR, name, &python])),
                },
            )?;
            Registration::Registered {
                workspace_file: path,
            }
        }
    };

    let cache = if provisioned {
        Some(list_component_types(config, Some(&root))?.status)
    } else {
        None
    };

    Ok(CodeLocationReport {
        name: name.to_string(),
        root,
        files,
        provisioned,
        registration,
        cache,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
