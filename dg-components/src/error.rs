//! Error types for dg-components.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::key::ComponentKey;

/// Errors from constructing or parsing a [`ComponentKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    #[error("component name must not be empty")]
    EmptyName,

    #[error("component namespace must not be empty")]
    EmptyNamespace,

    /// `.` and `@` are reserved by the typename grammar.
    #[error("invalid {part} '{value}': must not contain '.' or '@'")]
    ReservedCharacter { part: &'static str, value: String },

    #[error("invalid component typename '{typename}'")]
    InvalidTypename { typename: String },
}

/// A module could not be imported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("no module named '{module}'")]
    ModuleNotFound { module: String },

    /// The module's import-time initializer returned an error.
    #[error("module '{module}' failed during import: {message}")]
    InitFailed { module: String, message: String },
}

/// One failure observed during a discovery pass.
///
/// Import, malformed and source failures are recoverable and handled per
/// [`FailureMode`](crate::registry::FailureMode); collisions and invalid keys
/// are always fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryFailure {
    #[error("namespace '{namespace}' (from {origin}): {source}")]
    Import {
        namespace: String,
        origin: String,
        #[source]
        source: ImportError,
    },

    #[error("malformed entry point '{entry}' in {origin}: {reason}")]
    Malformed {
        origin: String,
        entry: String,
        reason: String,
    },

    #[error("cannot read discovery source {path}: {message}")]
    Source { path: PathBuf, message: String },

    #[error("duplicate component key {key}: defined in '{first}' and '{second}'")]
    Collision {
        key: ComponentKey,
        first: String,
        second: String,
    },

    #[error("component '{type_name}' in namespace '{namespace}' has an invalid key: {source}")]
    InvalidKey {
        namespace: String,
        type_name: String,
        #[source]
        source: KeyError,
    },
}

impl DiscoveryFailure {
    /// Whether the failure aborts the build regardless of failure mode.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DiscoveryFailure::Collision { .. } | DiscoveryFailure::InvalidKey { .. }
        )
    }
}

/// A discovery pass aborted. Lists every failure that caused the abort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryError {
    pub failures: Vec<DiscoveryFailure>,
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "component discovery failed with {} error(s):",
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  - {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DiscoveryError {}

/// Errors from registry queries and manual registration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no component type named {key}")]
    NotFound { key: ComponentKey },

    #[error("component type {key} is already registered (defined in '{existing}')")]
    Collision { key: ComponentKey, existing: String },

    #[error(transparent)]
    InvalidKey(#[from] KeyError),
}
