//! Component definitions as stored by the registry.

use std::collections::BTreeMap;
use std::fmt;

use heck::ToSnakeCase;

/// Marker trait for pluggable component types.
///
/// The registry never calls into a component; it only stores the
/// [`ComponentClass`] so consumers can construct one later.
pub trait Component: Send + Sync + 'static {}

/// String-keyed metadata attached at registration time.
pub type Metadata = BTreeMap<String, String>;

/// Opaque reference to a component type.
#[derive(Clone, Copy)]
pub struct ComponentClass {
    /// Rust type name as written at the registration site.
    pub type_name: &'static str,
    pub construct: fn() -> Box<dyn Component>,
}

impl ComponentClass {
    pub fn of<T: Component + Default>(type_name: &'static str) -> Self {
        Self {
            type_name,
            construct: construct::<T>,
        }
    }

    pub fn instantiate(&self) -> Box<dyn Component> {
        (self.construct)()
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentClass").field(&self.type_name).finish()
    }
}

impl PartialEq for ComponentClass {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name
    }
}

impl Eq for ComponentClass {}

/// Constructor used by `registered_component_type!`.
pub fn construct<T: Component + Default>() -> Box<dyn Component> {
    Box::new(T::default())
}

/// Name given to a component that was registered without an explicit one.
///
/// `TestComponent1` becomes `test_component1`.
pub fn default_component_name(type_name: &str) -> String {
    let bare = type_name.rsplit("::").next().unwrap_or(type_name);
    bare.to_snake_case()
}

/// One registered component type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDefinition {
    pub class: ComponentClass,
    pub name: String,
    pub metadata: Metadata,
    /// Module path holding the registration marker.
    pub defined_in: String,
}

impl ComponentDefinition {
    pub fn summary(&self) -> Option<&str> {
        self.metadata
            .get("summary")
            .map(String::as_str)
            .filter(|s| !s.trim().is_empty())
    }
}
