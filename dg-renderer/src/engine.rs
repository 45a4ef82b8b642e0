//! Tera rendering engine: [`TemplateKind`] enum and [`Renderer`].
//!
//! # Path mapping
//!
//! | Kind         | Output path(s)                                              |
//! |--------------|-------------------------------------------------------------|
//! | Deployment   | `pyproject.toml`, `workspace.yaml`, `.gitignore`            |
//! | CodeLocation | `pyproject.toml`, `<module>/__init__.py`,                   |
//! |              | `<module>/definitions.py`, `<module>/lib/__init__.py`,      |
//! |              | `<module>_tests/__init__.py`                                |

use std::path::{Path, PathBuf};

use tera::Tera;

use crate::context::ScaffoldContext;
use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Embedded templates: baked into the binary at compile time via include_str!
// ---------------------------------------------------------------------------

const TPLS: &[(&str, &str)] = &[
    (
        "deployment/pyproject.toml.tera",
        include_str!("templates/deployment/pyproject.toml.tera"),
    ),
    (
        "deployment/workspace.yaml.tera",
        include_str!("templates/deployment/workspace.yaml.tera"),
    ),
    ("deployment/gitignore.tera", include_str!("templates/deployment/gitignore.tera")),
    (
        "code_location/pyproject.toml.tera",
        include_str!("templates/code_location/pyproject.toml.tera"),
    ),
    (
        "code_location/package_init.py.tera",
        include_str!("templates/code_location/package_init.py.tera"),
    ),
    (
        "code_location/definitions.py.tera",
        include_str!("templates/code_location/definitions.py.tera"),
    ),
    (
        "code_location/lib_init.py.tera",
        include_str!("templates/code_location/lib_init.py.tera"),
    ),
    (
        "code_location/tests_init.py.tera",
        include_str!("templates/code_location/tests_init.py.tera"),
    ),
];

// ---------------------------------------------------------------------------
// Template loading
// ---------------------------------------------------------------------------

/// Embedded templates, each replaced by `<overrides>/<name>` when that file
/// exists. Files in the override dir that name no embedded template are ignored.
fn build_tera(overrides: Option<&Path>) -> Result<Tera, RenderError> {
    let mut templates = Vec::with_capacity(TPLS.len());
    for (name, embedded) in TPLS {
        let body = match overrides.map(|dir| dir.join(name)) {
            Some(path) if path.is_file() => std::fs::read_to_string(&path)
                .map_err(|e| RenderError::Io { path: path.clone(), source: e })?,
            _ => (*embedded).to_string(),
        };
        templates.push((*name, body));
    }
    let mut tera = Tera::default();
    tera.add_raw_templates(templates)?;
    Ok(tera)
}

// ---------------------------------------------------------------------------
// TemplateKind
// ---------------------------------------------------------------------------

/// Kinds of project that `dg` knows how to scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateKind {
    Deployment,
    CodeLocation,
}

impl TemplateKind {
    pub fn all() -> &'static [TemplateKind] {
        &[TemplateKind::Deployment, TemplateKind::CodeLocation]
    }

    /// Template names rendered for this kind.
    pub fn template_names(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::Deployment => &[
                "deployment/pyproject.toml.tera",
                "deployment/workspace.yaml.tera",
                "deployment/gitignore.tera",
            ],
            TemplateKind::CodeLocation => &[
                "code_location/pyproject.toml.tera",
                "code_location/package_init.py.tera",
                "code_location/definitions.py.tera",
                "code_location/lib_init.py.tera",
                "code_location/tests_init.py.tera",
            ],
        }
    }

    /// Output paths for this kind under `root`, one per template and in the
    /// same order as [`TemplateKind::template_names`].
    pub fn output_paths(&self, root: &Path, module_name: &str) -> Vec<PathBuf> {
        match self {
            TemplateKind::Deployment => vec![
                root.join("pyproject.toml"),
                root.join("workspace.yaml"),
                root.join(".gitignore"),
            ],
            TemplateKind::CodeLocation => {
                let package = root.join(module_name);
                vec![
                    root.join("pyproject.toml"),
                    package.join("__init__.py"),
                    package.join("definitions.py"),
                    package.join("lib").join("__init__.py"),
                    root.join(format!("{module_name}_tests")).join("__init__.py"),
                ]
            }
        }
    }

    /// Directories that must exist even though no template renders into them.
    pub fn extra_dirs(&self, root: &Path, module_name: &str) -> Vec<PathBuf> {
        match self {
            TemplateKind::Deployment => vec![root.join("code_locations")],
            TemplateKind::CodeLocation => vec![root.join(module_name).join("components")],
        }
    }
}

// ---------------------------------------------------------------------------
// TemplateEngine
// ---------------------------------------------------------------------------

/// Tera engine over the embedded templates.
///
/// An override dir mirrors the embedded layout, e.g.
/// `<dir>/code_location/definitions.py.tera`.
pub struct TemplateEngine {
    tera: Tera,
}

impl TemplateEngine {
    pub fn new(overrides: Option<&Path>) -> Result<Self, RenderError> {
        Ok(TemplateEngine { tera: build_tera(overrides)? })
    }

    /// Render every output file for `kind`.
    ///
    /// Returns `Vec<(output_path, rendered_content)>`, one entry per output file.
    pub fn render(
        &self,
        ctx: &ScaffoldContext,
        kind: TemplateKind,
    ) -> Result<Vec<(PathBuf, String)>, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        let names = kind.template_names();
        let paths = kind.output_paths(Path::new(&ctx.root_path), &ctx.module_name);

        debug_assert_eq!(
            names.len(),
            paths.len(),
            "template_names() and output_paths() must return equal-length slices for {:?}",
            kind
        );

        let mut results = Vec::with_capacity(names.len());
        for (name, path) in names.iter().zip(paths) {
            let content = self.tera.render(name, &tera_ctx)?;
            results.push((path, content));
        }
        Ok(results)
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Renderer over the embedded templates. Create once with [`Renderer::new`] and reuse.
pub struct Renderer {
    engine: TemplateEngine,
}

impl Renderer {
    pub fn new() -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(None)? })
    }

    /// Renderer whose embedded templates are overridden by `.tera` files in `dir`.
    pub fn with_overrides(dir: &Path) -> Result<Self, RenderError> {
        Ok(Renderer { engine: TemplateEngine::new(Some(dir))? })
    }

    /// Render `kind` for a project called `name` rooted at `root`.
    pub fn render(
        &self,
        name: &str,
        root: &Path,
        kind: TemplateKind,
    ) -> Result<Vec<(PathBuf, String)>, RenderError> {
        let ctx = ScaffoldContext::new(name, root);
        self.render_with_context(&ctx, kind)
    }

    pub fn render_with_context(
        &self,
        ctx: &ScaffoldContext,
        kind: TemplateKind,
    ) -> Result<Vec<(PathBuf, String)>, RenderError> {
        self.engine.render(ctx, kind)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
