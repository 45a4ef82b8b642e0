//! Component type registry.
//!
//! # Lifecycle
//!
//! ```text
//! RegistryBuilder::new()          Unbuilt
//!   .discover(..) / .register(..) Building
//!   .finish()                     Built   -> ComponentTypeRegistry (read-only)
//! discover(..) -> Err(..)         Failed
//! ```
//!
//! A built registry has no mutators. Refreshing the catalog means building a
//! new one.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::discovery::{DiscoverySource, EntryPointDiscovery, LinkedEntryPoints, ENTRY_POINT_GROUP};
use crate::error::{DiscoveryError, DiscoveryFailure, RegistryError};
use crate::key::ComponentKey;
use crate::module::{ModuleIndex, ModuleLoader};
use crate::resolver::NamespaceResolver;
use crate::types::ComponentDefinition;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What to do with recoverable discovery failures (unimportable namespaces,
/// malformed declarations, unreadable sources).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailureMode {
    /// Log a warning, record the failure, and carry on.
    #[default]
    Lenient,
    /// Abort on the first failure.
    Strict,
    /// Finish the pass, then fail with every failure seen.
    Collect,
}

impl fmt::Display for FailureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureMode::Lenient => write!(f, "lenient"),
            FailureMode::Strict => write!(f, "strict"),
            FailureMode::Collect => write!(f, "collect"),
        }
    }
}

impl FromStr for FailureMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(FailureMode::Lenient),
            "strict" => Ok(FailureMode::Strict),
            "collect" => Ok(FailureMode::Collect),
            other => Err(format!(
                "unknown discovery mode '{other}'; expected: lenient, strict, collect"
            )),
        }
    }
}

/// Settings for one discovery pass.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    pub group: String,
    pub mode: FailureMode,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            group: ENTRY_POINT_GROUP.to_string(),
            mode: FailureMode::default(),
        }
    }
}

impl DiscoveryOptions {
    pub fn with_mode(mode: FailureMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// A registry under construction.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    components: BTreeMap<ComponentKey, ComponentDefinition>,
    skipped: Vec<DiscoveryFailure>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition under `(namespace, name)`.
    ///
    /// Fails with [`RegistryError::Collision`] if the key is taken; the
    /// existing definition is left as it was.
    pub fn register(
        &mut self,
        namespace: &str,
        name: &str,
        mut definition: ComponentDefinition,
    ) -> Result<ComponentKey, RegistryError> {
        let key = ComponentKey::new(namespace, name)?;
        if let Some(existing) = self.components.get(&key) {
            return Err(RegistryError::Collision {
                key,
                existing: existing.defined_in.clone(),
            });
        }
        definition.name = name.to_string();
        self.components.insert(key.clone(), definition);
        Ok(key)
    }

    /// Run one discovery pass over `sources`, importing through `loader`.
    pub fn discover(
        &mut self,
        options: &DiscoveryOptions,
        sources: &[&dyn DiscoverySource],
        loader: &dyn ModuleLoader,
    ) -> Result<(), DiscoveryError> {
        let driver = EntryPointDiscovery::new(options.group.clone());
        let resolver = NamespaceResolver::new(loader);
        let mut collected = Vec::new();
        let mut fatal = Vec::new();

        for found in driver.discover(sources) {
            let outcome = found.and_then(|entry_point| {
                resolver
                    .resolve(&entry_point)
                    .map(|defs| (entry_point.clone(), defs))
                    .map_err(|source| DiscoveryFailure::Import {
                        namespace: entry_point.namespace.clone(),
                        origin: entry_point.origin.clone(),
                        source,
                    })
            });
            match outcome {
                Ok((entry_point, definitions)) => {
                    for definition in definitions {
                        if let Err(failure) = self.insert_discovered(&entry_point.namespace, definition) {
                            fatal.push(failure);
                        }
                    }
                }
                Err(failure) => match options.mode {
                    FailureMode::Strict => {
                        fatal.push(failure);
                        return Err(DiscoveryError { failures: fatal });
                    }
                    FailureMode::Collect => collected.push(failure),
                    FailureMode::Lenient => {
                        warn!(error = %failure, "skipping component namespace");
                        self.skipped.push(failure);
                    }
                },
            }
        }

        collected.extend(fatal);
        if collected.is_empty() {
            Ok(())
        } else {
            Err(DiscoveryError { failures: collected })
        }
    }

    fn insert_discovered(
        &mut self,
        namespace: &str,
        definition: ComponentDefinition,
    ) -> Result<(), DiscoveryFailure> {
        let key = ComponentKey::new(namespace, definition.name.as_str()).map_err(|source| {
            DiscoveryFailure::InvalidKey {
                namespace: namespace.to_string(),
                type_name: definition.class.type_name.to_string(),
                source,
            }
        })?;
        if let Some(existing) = self.components.get(&key) {
            return Err(DiscoveryFailure::Collision {
                key,
                first: existing.defined_in.clone(),
                second: definition.defined_in,
            });
        }
        self.components.insert(key, definition);
        Ok(())
    }

    /// Freeze into a read-only registry.
    pub fn finish(self) -> ComponentTypeRegistry {
        let namespaces: BTreeSet<&str> = self.components.keys().map(ComponentKey::namespace).collect();
        info!(
            components = self.components.len(),
            namespaces = namespaces.len(),
            skipped = self.skipped.len(),
            "built component type registry"
        );
        ComponentTypeRegistry {
            components: self.components,
            skipped: self.skipped,
        }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Read-only catalog of component types, keyed by [`ComponentKey`].
///
/// Iteration order is key order, so it is stable for a given set of
/// installed packages.
#[derive(Debug, Clone, Default)]
pub struct ComponentTypeRegistry {
    components: BTreeMap<ComponentKey, ComponentDefinition>,
    skipped: Vec<DiscoveryFailure>,
}

impl ComponentTypeRegistry {
    /// Discover every component type declared by linked packages, skipping
    /// namespaces that fail to import.
    pub fn from_entry_point_discovery() -> Result<Self, DiscoveryError> {
        Self::build(
            &DiscoveryOptions::default(),
            &[&LinkedEntryPoints],
            &ModuleIndex::linked(),
        )
    }

    /// Full discovery pass.
    pub fn build(
        options: &DiscoveryOptions,
        sources: &[&dyn DiscoverySource],
        loader: &dyn ModuleLoader,
    ) -> Result<Self, DiscoveryError> {
        let mut builder = RegistryBuilder::new();
        builder.discover(options, sources, loader)?;
        Ok(builder.finish())
    }

    pub fn keys(&self) -> impl Iterator<Item = &ComponentKey> {
        self.components.keys()
    }

    pub fn items(&self) -> impl Iterator<Item = (&ComponentKey, &ComponentDefinition)> {
        self.components.iter()
    }

    pub fn get(&self, key: &ComponentKey) -> Result<&ComponentDefinition, RegistryError> {
        self.components
            .get(key)
            .ok_or_else(|| RegistryError::NotFound { key: key.clone() })
    }

    pub fn get_by_typename(&self, typename: &str) -> Result<&ComponentDefinition, RegistryError> {
        let key = ComponentKey::from_typename(typename)?;
        self.get(&key)
    }

    pub fn contains(&self, key: &ComponentKey) -> bool {
        self.components.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Namespaces with at least one component, sorted.
    pub fn namespaces(&self) -> BTreeSet<&str> {
        self.components.keys().map(ComponentKey::namespace).collect()
    }

    /// Recoverable failures skipped while building (lenient mode only).
    pub fn failures(&self) -> &[DiscoveryFailure] {
        &self.skipped
    }
}
