//! dg-components: component type registry.
//!
//! Public API surface:
//! - [`key`]: [`ComponentKey`] and the typename format
//! - [`types`]: [`ComponentDefinition`], [`Component`], [`ComponentClass`]
//! - [`module`]: module records, [`ModuleLoader`], [`ModuleIndex`]
//! - [`resolver`]: [`NamespaceResolver`]
//! - [`discovery`]: discovery sources and [`EntryPointDiscovery`]
//! - [`registry`]: [`ComponentTypeRegistry`] and [`RegistryBuilder`]
//! - [`error`]: error types
//!
//! Built-in components live in [`builtins`]; crates contributing their own
//! register them with [`entry_point!`], [`component_module!`] and
//! [`registered_component_type!`].

#[macro_use]
mod macros;

pub mod builtins;
pub mod discovery;
pub mod error;
pub mod key;
pub mod module;
pub mod registry;
pub mod resolver;
pub mod types;

#[doc(hidden)]
pub use inventory;

pub use discovery::{
    DiscoverySource, EntryPoint, EntryPointDiscovery, LinkedEntryPoints, ManifestDirSource,
    RawEntryPoint, StaticEntryPoints, ENTRY_POINT_GROUP,
};
pub use error::{DiscoveryError, DiscoveryFailure, ImportError, KeyError, RegistryError};
pub use key::{ComponentKey, CORE_NAMESPACE};
pub use module::{ExportedComponent, ModuleExports, ModuleIndex, ModuleLoader};
pub use registry::{ComponentTypeRegistry, DiscoveryOptions, FailureMode, RegistryBuilder};
pub use resolver::NamespaceResolver;
pub use types::{Component, ComponentClass, ComponentDefinition, Metadata};
