//! Process configuration gathered from the environment.
//!
//! [`DgConfig::from_env`] reads every variable once; the CLI then applies its
//! flags on top. Library code takes a `&DgConfig` and never reads the
//! environment itself.

use std::path::PathBuf;

use dg_components::{DiscoveryOptions, FailureMode};

pub const CACHE_DIR_ENV: &str = "DG_CACHE_DIR";
pub const ENTRY_POINTS_DIR_ENV: &str = "DG_ENTRY_POINTS_DIR";
pub const DAGSTER_GIT_REPO_DIR_ENV: &str = "DAGSTER_GIT_REPO_DIR";
pub const UV_BIN_ENV: &str = "DG_UV_BIN";
pub const TEMPLATE_DIR_ENV: &str = "DG_TEMPLATE_DIR";

const DEFAULT_UV_BIN: &str = "uv";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DgConfig {
    /// Explicit cache root; `None` falls back to the platform cache dir.
    pub cache_dir: Option<PathBuf>,
    pub disable_cache: bool,
    /// Directory of `*.dist-info` manifests scanned next to linked entry points.
    pub entry_points_dir: Option<PathBuf>,
    pub dagster_git_repo_dir: Option<PathBuf>,
    pub uv_bin: String,
    pub discovery_mode: FailureMode,
    /// Scaffold templates that replace the built-in ones, same layout.
    pub template_dir: Option<PathBuf>,
}

impl Default for DgConfig {
    fn default() -> Self {
        DgConfig {
            cache_dir: None,
            disable_cache: false,
            entry_points_dir: None,
            dagster_git_repo_dir: None,
            uv_bin: DEFAULT_UV_BIN.to_string(),
            discovery_mode: FailureMode::default(),
            template_dir: None,
        }
    }
}

impl DgConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        DgConfig {
            cache_dir: var(CACHE_DIR_ENV).map(PathBuf::from),
            entry_points_dir: var(ENTRY_POINTS_DIR_ENV).map(PathBuf::from),
            dagster_git_repo_dir: var(DAGSTER_GIT_REPO_DIR_ENV).map(PathBuf::from),
            uv_bin: var(UV_BIN_ENV).unwrap_or_else(|| DEFAULT_UV_BIN.to_string()),
            template_dir: var(TEMPLATE_DIR_ENV).map(PathBuf::from),
            ..DgConfig::default()
        }
    }

    /// Root directory for cached component listings, or `None` when caching
    /// is disabled or no cache location can be determined.
    pub fn cache_root(&self) -> Option<PathBuf> {
        if self.disable_cache {
            return None;
        }
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("dg")))
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions::with_mode(self.discovery_mode)
    }
}
