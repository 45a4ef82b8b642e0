//! Building the component type registry for a command and listing it
//! through the cache.

use std::path::{Path, PathBuf};

use dg_components::{
    ComponentTypeRegistry, DiscoverySource, LinkedEntryPoints, ManifestDirSource, ModuleIndex,
};

use crate::cache::{self, CacheEntry, CacheStatus, CachedComponent};
use crate::config::DgConfig;
use crate::error::WorkspaceError;

/// Run discovery over linked packages plus the configured manifest directory.
pub fn load_registry(config: &DgConfig) -> Result<ComponentTypeRegistry, WorkspaceError> {
    let manifests = config
        .entry_points_dir
        .as_ref()
        .map(|dir| ManifestDirSource::new(dir.clone()));
    let mut sources: Vec<&dyn DiscoverySource> = vec![&LinkedEntryPoints];
    if let Some(m) = manifests.as_ref() {
        sources.push(m);
    }
    let registry =
        ComponentTypeRegistry::build(&config.discovery_options(), &sources, &ModuleIndex::linked())?;
    tracing::debug!(
        types = registry.len(),
        skipped = registry.failures().len(),
        "component type registry built"
    );
    Ok(registry)
}

pub fn summarize(registry: &ComponentTypeRegistry) -> Vec<CachedComponent> {
    registry
        .items()
        .map(|(key, def)| CachedComponent {
            typename: key.to_typename(),
            summary: def.summary().map(str::to_string),
        })
        .collect()
}

/// Component types available, with where they came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentListing {
    pub status: CacheStatus,
    pub components: Vec<CachedComponent>,
}

fn discriminators(config: &DgConfig) -> Vec<String> {
    vec![
        config.discovery_mode.to_string(),
        config
            .entry_points_dir
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default(),
    ]
}

/// Manifests the configured directory would be scanned for. An unreadable
/// directory contributes nothing; discovery reports it.
fn scanned_manifests(config: &DgConfig) -> Vec<PathBuf> {
    config
        .entry_points_dir
        .as_ref()
        .and_then(|dir| ManifestDirSource::new(dir.clone()).manifest_paths().ok())
        .unwrap_or_default()
}

/// List component types for a command run in `location_root`.
///
/// Caching applies only inside a code location with a cache root configured;
/// otherwise the status is [`CacheStatus::Disabled`] and discovery always runs.
pub fn list_component_types(
    config: &DgConfig,
    location_root: Option<&Path>,
) -> Result<ComponentListing, WorkspaceError> {
    let (Some(cache_root), Some(location_root)) = (config.cache_root(), location_root) else {
        return Ok(ComponentListing {
            status: CacheStatus::Disabled,
            components: summarize(&load_registry(config)?),
        });
    };

    let discriminators = discriminators(config);
    let parts: Vec<&str> = discriminators.iter().map(String::as_str).collect();
    let key = cache::cache_key(location_root, &parts, &scanned_manifests(config))?;

    if let Some(entry) = cache::load_at(&cache_root, &key)? {
        tracing::debug!(%key, "component listing cache hit");
        return Ok(ComponentListing {
            status: CacheStatus::Hit,
            components: entry.components,
        });
    }

    tracing::debug!(%key, "component listing cache miss");
    let components = summarize(&load_registry(config)?);
    cache::save_at(
        &cache_root,
        &CacheEntry {
            key,
            components: components.clone(),
        },
    )?;
    Ok(ComponentListing {
        status: CacheStatus::Miss,
        components,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn location() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("pyproject.toml"),
            "[tool.dg]\nis_code_location = true\n",
        )
        .unwrap();
        dir
    }

    fn config_with_cache(cache: &Path) -> DgConfig {
        DgConfig {
            cache_dir: Some(cache.to_path_buf()),
            ..DgConfig::default()
        }
    }

    #[test]
    fn miss_then_hit() {
        let cache = TempDir::new().unwrap();
        let loc = location();
        let config = config_with_cache(cache.path());

        let first = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(first.status, CacheStatus::Miss);
        let second = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(second.status, CacheStatus::Hit);
        assert_eq!(first.components, second.components);
        assert!(second
            .components
            .iter()
            .any(|c| c.typename == "pipes_subprocess_script_collection@dagster_components"));
    }

    #[test]
    fn disabled_outside_code_location() {
        let cache = TempDir::new().unwrap();
        let listing = list_component_types(&config_with_cache(cache.path()), None).unwrap();
        assert_eq!(listing.status, CacheStatus::Disabled);
        assert!(!listing.components.is_empty());
    }

    #[test]
    fn disabled_when_cache_turned_off() {
        let cache = TempDir::new().unwrap();
        let loc = location();
        let config = DgConfig {
            disable_cache: true,
            ..config_with_cache(cache.path())
        };
        let listing = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(listing.status, CacheStatus::Disabled);
        assert!(!cache.path().join("component_registry").exists());
    }

    #[test]
    fn installing_a_package_invalidates() {
        let cache = TempDir::new().unwrap();
        let site = TempDir::new().unwrap();
        let loc = location();
        let config = DgConfig {
            entry_points_dir: Some(site.path().to_path_buf()),
            ..config_with_cache(cache.path())
        };

        let first = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(first.status, CacheStatus::Miss);

        let dist_info = site.path().join("extra_pkg-0.1.0.dist-info");
        std::fs::create_dir_all(&dist_info).unwrap();
        std::fs::write(
            dist_info.join("entry_points.txt"),
            "[dagster.components]\nextra_pkg = dagster_components.lib\n",
        )
        .unwrap();

        let second = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(second.status, CacheStatus::Miss);
        assert_eq!(second.components, summarize(&load_registry(&config).unwrap()));
        assert_ne!(first.components, second.components);

        let third = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(third.status, CacheStatus::Hit);
    }

    #[test]
    fn changed_lock_file_invalidates() {
        let cache = TempDir::new().unwrap();
        let loc = location();
        let config = config_with_cache(cache.path());
        list_component_types(&config, Some(loc.path())).unwrap();
        std::fs::write(loc.path().join("uv.lock"), "changed").unwrap();
        let again = list_component_types(&config, Some(loc.path())).unwrap();
        assert_eq!(again.status, CacheStatus::Miss);
    }
}
