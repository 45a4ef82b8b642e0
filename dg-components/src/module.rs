//! Module records and the module index the resolver imports from.
//!
//! Linked crates declare modules with `component_module!` and attach the
//! registration marker to component types with `registered_component_type!`.
//! Both submit static records through `inventory`; [`ModuleIndex::linked`]
//! collects them into an importable index. Tests and embedders can build an
//! index by hand with [`ModuleIndex::new`] and the `with_*` methods.

use std::collections::HashMap;
use std::sync::OnceLock;

use tracing::debug;

use crate::error::ImportError;
use crate::types::{Component, ComponentClass, Metadata};

/// Import-time initializer. An `Err` fails the import of its module.
pub type ModuleInit = fn() -> Result<(), String>;

/// Static declaration of a module and the child modules it re-exports.
pub struct ModuleStatic {
    pub path: &'static str,
    pub reexports: &'static [&'static str],
    pub init: Option<ModuleInit>,
}

/// Wrapper for `inventory::collect!`.
pub struct ModuleReg(pub &'static ModuleStatic);

inventory::collect!(ModuleReg);

/// Registration marker for one component type.
pub struct ComponentTypeStatic {
    /// Module the component belongs to.
    pub module: &'static str,
    pub type_name: &'static str,
    /// Explicit name; `None` derives one from `type_name`.
    pub name: Option<&'static str>,
    pub metadata: &'static [(&'static str, &'static str)],
    pub construct: fn() -> Box<dyn Component>,
}

/// Wrapper for `inventory::collect!`.
pub struct ComponentTypeReg(pub &'static ComponentTypeStatic);

inventory::collect!(ComponentTypeReg);

/// A component found in a module, before key assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedComponent {
    pub class: ComponentClass,
    pub name: Option<String>,
    pub metadata: Metadata,
}

impl ExportedComponent {
    pub fn new(class: ComponentClass) -> Self {
        Self {
            class,
            name: None,
            metadata: Metadata::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn from_static(reg: &ComponentTypeStatic) -> Self {
        Self {
            class: ComponentClass {
                type_name: reg.type_name,
                construct: reg.construct,
            },
            name: reg.name.map(str::to_string),
            metadata: reg
                .metadata
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// What importing a module yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleExports {
    pub path: String,
    pub components: Vec<ExportedComponent>,
    /// Child module paths to walk next, in declaration order.
    pub reexports: Vec<String>,
}

/// Imports modules by dotted path.
pub trait ModuleLoader {
    fn import(&self, module_path: &str) -> Result<ModuleExports, ImportError>;
}

#[derive(Debug, Clone, Default)]
struct ModuleEntry {
    reexports: Vec<String>,
    components: Vec<ExportedComponent>,
    init: Option<ModuleInit>,
    // Like a host import system, a module initializes at most once.
    init_result: OnceLock<Result<(), String>>,
}

/// Importable set of modules.
#[derive(Debug, Clone, Default)]
pub struct ModuleIndex {
    modules: HashMap<String, ModuleEntry>,
}

impl ModuleIndex {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of every module and component type submitted by linked crates.
    ///
    /// A component whose module was never declared still makes that module
    /// importable (with no re-exports).
    pub fn linked() -> Self {
        let mut index = Self::new();
        for reg in inventory::iter::<ModuleReg> {
            let decl = reg.0;
            let entry = index.entry(decl.path);
            entry
                .reexports
                .extend(decl.reexports.iter().map(|s| s.to_string()));
            if decl.init.is_some() {
                entry.init = decl.init;
            }
        }
        for reg in inventory::iter::<ComponentTypeReg> {
            index
                .entry(reg.0.module)
                .components
                .push(ExportedComponent::from_static(reg.0));
        }
        // inventory yields records in link order; pin a stable order.
        for entry in index.modules.values_mut() {
            entry
                .components
                .sort_by(|a, b| a.class.type_name.cmp(b.class.type_name));
        }
        index
    }

    pub fn with_module(mut self, path: &str, reexports: &[&str]) -> Self {
        self.entry(path)
            .reexports
            .extend(reexports.iter().map(|s| s.to_string()));
        self
    }

    pub fn with_component(mut self, module: &str, component: ExportedComponent) -> Self {
        self.entry(module).components.push(component);
        self
    }

    pub fn with_init(mut self, module: &str, init: ModuleInit) -> Self {
        self.entry(module).init = Some(init);
        self
    }

    pub fn contains(&self, module_path: &str) -> bool {
        self.modules.contains_key(module_path)
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    fn entry(&mut self, path: &str) -> &mut ModuleEntry {
        self.modules.entry(path.to_string()).or_default()
    }
}

impl ModuleLoader for ModuleIndex {
    fn import(&self, module_path: &str) -> Result<ModuleExports, ImportError> {
        let entry = self
            .modules
            .get(module_path)
            .ok_or_else(|| ImportError::ModuleNotFound {
                module: module_path.to_string(),
            })?;

        if let Some(init) = entry.init {
            entry
                .init_result
                .get_or_init(init)
                .clone()
                .map_err(|message| ImportError::InitFailed {
                    module: module_path.to_string(),
                    message,
                })?;
        }

        debug!(
            module = module_path,
            components = entry.components.len(),
            reexports = entry.reexports.len(),
            "imported module"
        );
        Ok(ModuleExports {
            path: module_path.to_string(),
            components: entry.components.clone(),
            reexports: entry.reexports.clone(),
        })
    }
}
