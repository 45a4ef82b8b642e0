//! Namespace resolution: walk an entry point's module graph and collect every
//! registered component type reachable from it.

use std::collections::HashSet;

use crate::discovery::EntryPoint;
use crate::error::ImportError;
use crate::module::ModuleLoader;
use crate::types::{default_component_name, ComponentDefinition};

/// Resolves one `(namespace, module_path)` declaration at a time.
pub struct NamespaceResolver<'a> {
    loader: &'a dyn ModuleLoader,
}

impl<'a> NamespaceResolver<'a> {
    pub fn new(loader: &'a dyn ModuleLoader) -> Self {
        Self { loader }
    }

    /// Import the entry point's module, then every module it re-exports,
    /// depth first, and return the component definitions found.
    ///
    /// Definitions come out in walk order: a module's own components first,
    /// then those of each re-exported child in declaration order. A module
    /// reachable along several paths is imported once.
    ///
    /// Any import failure fails the whole namespace.
    pub fn resolve(&self, entry_point: &EntryPoint) -> Result<Vec<ComponentDefinition>, ImportError> {
        let mut visited = HashSet::new();
        let mut definitions = Vec::new();
        self.walk(&entry_point.module_path, &mut visited, &mut definitions)?;
        Ok(definitions)
    }

    fn walk(
        &self,
        module_path: &str,
        visited: &mut HashSet<String>,
        out: &mut Vec<ComponentDefinition>,
    ) -> Result<(), ImportError> {
        if !visited.insert(module_path.to_string()) {
            return Ok(());
        }
        let exports = self.loader.import(module_path)?;
        for component in exports.components {
            let name = component
                .name
                .unwrap_or_else(|| default_component_name(component.class.type_name));
            out.push(ComponentDefinition {
                class: component.class,
                name,
                metadata: component.metadata,
                defined_in: exports.path.clone(),
            });
        }
        for child in &exports.reexports {
            self.walk(child, visited, out)?;
        }
        Ok(())
    }
}
