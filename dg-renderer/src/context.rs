//! Template context: serializable rendering payload for a scaffold.

use serde::{Deserialize, Serialize};

/// Packages every scaffolded code location depends on.
pub const CODE_LOCATION_DEPENDENCIES: &[&str] = &["dagster", "dagster-components"];

/// Development-only packages for scaffolded code locations.
pub const CODE_LOCATION_DEV_DEPENDENCIES: &[&str] = &["dagster-webserver"];

/// Rendering payload shared by deployment and code location templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldContext {
    /// Directory name as given on the command line (e.g. `foo-bar`).
    pub project_name: String,
    /// Importable package name derived from `project_name` (e.g. `foo_bar`).
    pub module_name: String,
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    /// Directory the outputs are rendered into.
    pub root_path: String,
    pub dg_version: String,
}

impl ScaffoldContext {
    /// Context for a project named `name` rendered under `root_path`.
    pub fn new(name: &str, root_path: &std::path::Path) -> Self {
        ScaffoldContext {
            project_name: name.to_string(),
            module_name: module_name_for(name),
            dependencies: CODE_LOCATION_DEPENDENCIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dev_dependencies: CODE_LOCATION_DEV_DEPENDENCIES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            root_path: root_path.to_string_lossy().into_owned(),
            dg_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Convert to a [`tera::Context`].
    pub fn to_tera_context(&self) -> Result<tera::Context, crate::error::RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

/// `foo-bar` → `foo_bar`.
pub fn module_name_for(project_name: &str) -> String {
    project_name.replace('-', "_")
}
