//! # dg-workspace
//!
//! Everything `dg` does to the filesystem: detecting whether a command runs
//! inside a deployment or code location, scaffolding both, registering code
//! locations in `workspace.yaml`, pinning editable dagster sources,
//! provisioning environments, and caching component listings.
//!
//! Functions take explicit paths and a [`DgConfig`]; nothing here reads the
//! process environment except [`DgConfig::from_env`].

pub mod cache;
pub mod config;
pub mod context;
pub mod editable;
pub mod error;
pub mod listing;
pub mod provision;
pub mod scaffold;
pub mod workspace_file;
pub mod writer;

pub use cache::{CacheStatus, CachedComponent};
pub use config::DgConfig;
pub use context::{list_code_locations, DgContext};
pub use editable::EditableDagster;
pub use error::WorkspaceError;
pub use listing::{list_component_types, load_registry, ComponentListing};
pub use provision::{EnvironmentProvisioner, UvProvisioner};
pub use scaffold::{
    scaffold_code_location, scaffold_deployment, CodeLocationOptions, CodeLocationReport,
    Registration,
};
pub use writer::WriteResult;
