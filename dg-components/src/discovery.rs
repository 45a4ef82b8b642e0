//! Entry point discovery.
//!
//! A [`DiscoverySource`] enumerates raw `(group, name, value)` declarations;
//! [`EntryPointDiscovery`] keeps the ones in the component group and
//! validates them into [`EntryPoint`]s. Three sources are provided:
//!
//! - [`LinkedEntryPoints`]: declarations submitted by linked crates with
//!   `entry_point!`
//! - [`ManifestDirSource`]: `*.dist-info/entry_points.txt` manifests under a
//!   package directory (e.g. a `site-packages` directory)
//! - [`StaticEntryPoints`]: an explicit list

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::DiscoveryFailure;

/// Group under which packages declare component namespaces.
pub const ENTRY_POINT_GROUP: &str = "dagster.components";

/// Manifest file read inside each `*.dist-info` directory.
pub const ENTRY_POINTS_FILE_NAME: &str = "entry_points.txt";

/// A declaration as found in a source, not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEntryPoint {
    pub group: String,
    pub name: String,
    pub value: String,
    /// Where the declaration came from, for reports.
    pub origin: String,
}

/// A validated namespace declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPoint {
    pub namespace: String,
    pub module_path: String,
    pub origin: String,
}

/// Anything that can enumerate entry point declarations.
pub trait DiscoverySource {
    /// Short description used in logs.
    fn describe(&self) -> String;

    /// Every declaration this source knows about, in any group.
    ///
    /// An `Err` element stands for something that could not be read; it does
    /// not stop the remaining elements from being used.
    fn entry_points(&self) -> Vec<Result<RawEntryPoint, DiscoveryFailure>>;
}

// ---------------------------------------------------------------------------
// Linked entry points
// ---------------------------------------------------------------------------

/// Static entry point declaration submitted by `entry_point!`.
pub struct EntryPointStatic {
    pub group: &'static str,
    pub namespace: &'static str,
    pub module: &'static str,
    /// Crate that submitted the declaration.
    pub package: &'static str,
}

/// Wrapper for `inventory::collect!`.
pub struct EntryPointReg(pub &'static EntryPointStatic);

inventory::collect!(EntryPointReg);

/// Entry points declared by crates linked into this process.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkedEntryPoints;

impl DiscoverySource for LinkedEntryPoints {
    fn describe(&self) -> String {
        "linked packages".to_string()
    }

    fn entry_points(&self) -> Vec<Result<RawEntryPoint, DiscoveryFailure>> {
        let mut found: Vec<RawEntryPoint> = inventory::iter::<EntryPointReg>
            .into_iter()
            .map(|reg| RawEntryPoint {
                group: reg.0.group.to_string(),
                name: reg.0.namespace.to_string(),
                value: reg.0.module.to_string(),
                origin: format!("linked:{}", reg.0.package),
            })
            .collect();
        found.sort_by(|a, b| (&a.name, &a.value).cmp(&(&b.name, &b.value)));
        found.into_iter().map(Ok).collect()
    }
}

// ---------------------------------------------------------------------------
// Manifest directory
// ---------------------------------------------------------------------------

/// Scans `<dir>/*.dist-info/entry_points.txt`.
#[derive(Debug, Clone)]
pub struct ManifestDirSource {
    dir: PathBuf,
}

impl ManifestDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Sorted manifest files this source reads.
    pub fn manifest_paths(&self) -> Result<Vec<PathBuf>, DiscoveryFailure> {
        let source_err = |e: std::io::Error| DiscoveryFailure::Source {
            path: self.dir.clone(),
            message: e.to_string(),
        };
        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)
            .map_err(source_err)?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .filter(|e| e.file_name().to_string_lossy().ends_with(".dist-info"))
            .map(|e| e.path().join(ENTRY_POINTS_FILE_NAME))
            .filter(|p| p.is_file())
            .collect();
        paths.sort();
        Ok(paths)
    }
}

impl DiscoverySource for ManifestDirSource {
    fn describe(&self) -> String {
        format!("manifests in {}", self.dir.display())
    }

    fn entry_points(&self) -> Vec<Result<RawEntryPoint, DiscoveryFailure>> {
        let paths = match self.manifest_paths() {
            Ok(paths) => paths,
            Err(failure) => return vec![Err(failure)],
        };
        let mut out = Vec::new();
        for path in paths {
            match std::fs::read_to_string(&path) {
                Ok(contents) => out.extend(
                    parse_entry_points_txt(&contents, &path.display().to_string())
                        .into_iter()
                        .map(Ok),
                ),
                Err(e) => out.push(Err(DiscoveryFailure::Source {
                    path,
                    message: e.to_string(),
                })),
            }
        }
        out
    }
}

/// Parse an `entry_points.txt` manifest.
///
/// Sections name groups; `name = value` lines declare entry points. A line
/// without `=` is kept with an empty value so validation reports it as
/// malformed if it sits in the component group. Lines before the first
/// section have no group and are never selected.
pub fn parse_entry_points_txt(contents: &str, origin: &str) -> Vec<RawEntryPoint> {
    let mut group = String::new();
    let mut out = Vec::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            group = section.trim().to_string();
            continue;
        }
        let (name, value) = match line.split_once('=') {
            Some((name, value)) => (name.trim(), value.trim()),
            None => (line, ""),
        };
        out.push(RawEntryPoint {
            group: group.clone(),
            name: name.to_string(),
            value: value.to_string(),
            origin: origin.to_string(),
        });
    }
    out
}

// ---------------------------------------------------------------------------
// Static list
// ---------------------------------------------------------------------------

/// A fixed list of declarations.
#[derive(Debug, Clone, Default)]
pub struct StaticEntryPoints {
    entries: Vec<RawEntryPoint>,
}

impl StaticEntryPoints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a declaration in the component group.
    pub fn with(mut self, namespace: &str, module_path: &str) -> Self {
        self.entries.push(RawEntryPoint {
            group: ENTRY_POINT_GROUP.to_string(),
            name: namespace.to_string(),
            value: module_path.to_string(),
            origin: "static".to_string(),
        });
        self
    }

    pub fn with_raw(mut self, raw: RawEntryPoint) -> Self {
        self.entries.push(raw);
        self
    }
}

impl DiscoverySource for StaticEntryPoints {
    fn describe(&self) -> String {
        format!("{} static declaration(s)", self.entries.len())
    }

    fn entry_points(&self) -> Vec<Result<RawEntryPoint, DiscoveryFailure>> {
        self.entries.iter().cloned().map(Ok).collect()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Selects and validates declarations in one entry point group.
#[derive(Debug, Clone)]
pub struct EntryPointDiscovery {
    group: String,
}

impl Default for EntryPointDiscovery {
    fn default() -> Self {
        Self::new(ENTRY_POINT_GROUP)
    }
}

impl EntryPointDiscovery {
    pub fn new(group: impl Into<String>) -> Self {
        Self { group: group.into() }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    /// Enumerate every source in order. Failures are returned in place; the
    /// caller decides whether they are fatal.
    pub fn discover(
        &self,
        sources: &[&dyn DiscoverySource],
    ) -> Vec<Result<EntryPoint, DiscoveryFailure>> {
        let mut out = Vec::new();
        for source in sources {
            let found = source.entry_points();
            debug!(source = %source.describe(), declarations = found.len(), "enumerated entry points");
            for item in found {
                match item {
                    Ok(raw) if raw.group == self.group => out.push(validate(raw)),
                    Ok(_) => {}
                    Err(failure) => out.push(Err(failure)),
                }
            }
        }
        out
    }
}

/// Check a raw declaration: the name must be a valid namespace and the value
/// a dotted module path.
pub fn validate(raw: RawEntryPoint) -> Result<EntryPoint, DiscoveryFailure> {
    let malformed = |reason: &str| DiscoveryFailure::Malformed {
        origin: raw.origin.clone(),
        entry: format!("{} = {}", raw.name, raw.value),
        reason: reason.to_string(),
    };
    if !is_identifier(&raw.name) {
        return Err(malformed("namespace must be an identifier"));
    }
    if raw.value.is_empty() {
        return Err(malformed("missing module path"));
    }
    if raw.value.contains(':') {
        return Err(malformed("entry point must name a module, not an attribute"));
    }
    if !raw.value.split('.').all(is_identifier) {
        return Err(malformed("module path must be dotted identifiers"));
    }
    Ok(EntryPoint {
        namespace: raw.name,
        module_path: raw.value,
        origin: raw.origin,
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
