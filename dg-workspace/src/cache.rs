//! Component listing cache.
//!
//! Persists one JSON document per cache key at
//! `<cache_root>/component_registry/<key>.json`. The key is a SHA-256 over
//! the `dg` version, the code location path, its `pyproject.toml` and
//! `uv.lock`, every scanned entry point manifest, and caller-supplied
//! discriminators, so any change to the location's dependencies or to the
//! installed packages invalidates the entry.
//! Writes use the same atomic `.tmp` + rename pattern as every other file.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::context::PYPROJECT_FILE;
use crate::error::{io_err, WorkspaceError};
use crate::provision::LOCK_FILE;
use crate::writer::atomic_write;

const CACHE_SUBDIR: &str = "component_registry";

/// One cached component type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedComponent {
    pub typename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// On-disk cache payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub components: Vec<CachedComponent>,
}

/// Whether a listing came from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Disabled,
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheStatus::Hit => write!(f, "hit"),
            CacheStatus::Miss => write!(f, "miss"),
            CacheStatus::Disabled => write!(f, "disabled"),
        }
    }
}

fn hash_file_into(hasher: &mut Sha256, path: &Path) -> Result<(), WorkspaceError> {
    match std::fs::read(path) {
        Ok(bytes) => {
            hasher.update(path.file_name().map(|n| n.as_encoded_bytes()).unwrap_or_default());
            hasher.update(b"\0");
            hasher.update(&bytes);
            hasher.update(b"\0");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err(path, e)),
    }
}

/// Cache key for the code location at `location_root`.
///
/// `manifests` are hashed by full path and contents, so installing or
/// removing a package in a scanned directory changes the key.
pub fn cache_key(
    location_root: &Path,
    discriminators: &[&str],
    manifests: &[PathBuf],
) -> Result<String, WorkspaceError> {
    let root = location_root
        .canonicalize()
        .map_err(|e| io_err(location_root, e))?;
    let mut hasher = Sha256::new();
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hasher.update(b"\0");
    hasher.update(root.to_string_lossy().as_bytes());
    hasher.update(b"\0");
    hash_file_into(&mut hasher, &root.join(PYPROJECT_FILE))?;
    hash_file_into(&mut hasher, &root.join(LOCK_FILE))?;
    for manifest in manifests {
        hasher.update(manifest.to_string_lossy().as_bytes());
        hasher.update(b"\0");
        hash_file_into(&mut hasher, manifest)?;
    }
    for d in discriminators {
        hasher.update(d.as_bytes());
        hasher.update(b"\0");
    }
    Ok(hex::encode(hasher.finalize()))
}

/// `<cache_root>/component_registry/<key>.json`
pub fn entry_path_at(cache_root: &Path, key: &str) -> PathBuf {
    cache_root.join(CACHE_SUBDIR).join(format!("{key}.json"))
}

/// Load the entry for `key`, or `None` if it is not cached.
///
/// An unreadable entry is treated as a miss so it gets rewritten.
pub fn load_at(cache_root: &Path, key: &str) -> Result<Option<CacheEntry>, WorkspaceError> {
    let path = entry_path_at(cache_root, key);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    match serde_json::from_str::<CacheEntry>(&contents) {
        Ok(entry) if entry.key == key => Ok(Some(entry)),
        Ok(_) => Ok(None),
        Err(e) => {
            tracing::warn!("discarding corrupt cache entry {}: {e}", path.display());
            Ok(None)
        }
    }
}

/// Save `entry` atomically.
pub fn save_at(cache_root: &Path, entry: &CacheEntry) -> Result<(), WorkspaceError> {
    let path = entry_path_at(cache_root, &entry.key);
    let json = serde_json::to_string_pretty(entry)?;
    atomic_write(&path, &json)?;
    Ok(())
}
