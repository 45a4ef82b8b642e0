//! Component keys and their typename form.
//!
//! A [`ComponentKey`] is the `(namespace, name)` pair identifying one
//! component type. Its canonical string form, the *typename*, is
//! `name@namespace` for the core namespace and `namespace.name` for
//! everything contributed by third-party packages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::KeyError;

/// Namespace reserved for components shipped with the core package.
pub const CORE_NAMESPACE: &str = "dagster_components";

/// Globally unique identifier of a component type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ComponentKey {
    namespace: String,
    name: String,
}

impl ComponentKey {
    /// Key assignment: validates both parts and builds the key.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Result<Self, KeyError> {
        let namespace = namespace.into();
        let name = name.into();
        if name.is_empty() {
            return Err(KeyError::EmptyName);
        }
        if namespace.is_empty() {
            return Err(KeyError::EmptyNamespace);
        }
        check_part("name", &name)?;
        check_part("namespace", &namespace)?;
        Ok(Self { namespace, name })
    }

    /// Key for a component in [`CORE_NAMESPACE`].
    pub fn core(name: impl Into<String>) -> Result<Self, KeyError> {
        Self::new(CORE_NAMESPACE, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_core(&self) -> bool {
        self.namespace == CORE_NAMESPACE
    }

    pub fn to_typename(&self) -> String {
        if self.is_core() {
            format!("{}@{}", self.name, self.namespace)
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Inverse of [`to_typename`](Self::to_typename).
    pub fn from_typename(typename: &str) -> Result<Self, KeyError> {
        let invalid = || KeyError::InvalidTypename {
            typename: typename.to_string(),
        };
        if let Some((name, namespace)) = typename.split_once('@') {
            if namespace != CORE_NAMESPACE {
                return Err(invalid());
            }
            return Self::new(namespace, name).map_err(|_| invalid());
        }
        let (namespace, name) = typename.split_once('.').ok_or_else(invalid)?;
        // `ns.name` for the core namespace would not round-trip.
        if namespace == CORE_NAMESPACE {
            return Err(invalid());
        }
        Self::new(namespace, name).map_err(|_| invalid())
    }
}

fn check_part(part: &'static str, value: &str) -> Result<(), KeyError> {
    if value.contains(['.', '@']) {
        return Err(KeyError::ReservedCharacter {
            part,
            value: value.to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_typename())
    }
}

impl FromStr for ComponentKey {
    type Err = KeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_typename(s)
    }
}

impl TryFrom<String> for ComponentKey {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_typename(&s)
    }
}

impl From<ComponentKey> for String {
    fn from(key: ComponentKey) -> Self {
        key.to_typename()
    }
}
