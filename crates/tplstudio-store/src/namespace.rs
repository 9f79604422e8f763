//! Document namespaces.
//!
//! A namespace maps a logical document type ("device", "snmp", "lookup") to a
//! root directory and an allow-list of file extensions. The set of namespaces
//! is fixed at construction time and never mutated at runtime.

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One configured category of documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    /// Key used by callers to select this namespace.
    pub key: String,
    /// Root directory holding this namespace's files.
    pub root: PathBuf,
    /// Allowed file extensions, matched case-insensitively (e.g. `.odt`).
    pub extensions: Vec<String>,
}

impl Namespace {
    /// Create a namespace.
    pub fn new(
        key: impl Into<String>,
        root: impl Into<PathBuf>,
        extensions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            key: key.into(),
            root: root.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    /// Case-insensitive suffix match against the extension allow-list.
    pub fn matches(&self, filename: &str) -> bool {
        let lower = filename.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&ext.to_lowercase()))
    }
}

/// Fixed lookup table of namespaces, resolved at startup.
#[derive(Debug, Clone, Default)]
pub struct NamespaceTable {
    namespaces: BTreeMap<String, Namespace>,
}

impl NamespaceTable {
    /// Build the table from a list of namespaces. Later entries with a
    /// duplicate key replace earlier ones.
    pub fn new(namespaces: impl IntoIterator<Item = Namespace>) -> Self {
        Self {
            namespaces: namespaces
                .into_iter()
                .map(|ns| (ns.key.clone(), ns))
                .collect(),
        }
    }

    /// Look up a namespace by key.
    pub fn get(&self, key: &str) -> StoreResult<&Namespace> {
        self.namespaces
            .get(key)
            .ok_or_else(|| StoreError::UnknownNamespace(key.to_string()))
    }

    /// Iterate over all configured namespaces.
    pub fn iter(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.values()
    }

    /// The extension allow-list for a namespace.
    pub fn extensions(&self, key: &str) -> StoreResult<&[String]> {
        Ok(&self.get(key)?.extensions)
    }

    /// Case-insensitive suffix match against a namespace's allow-list.
    pub fn matches(&self, key: &str, filename: &str) -> StoreResult<bool> {
        Ok(self.get(key)?.matches(filename))
    }

    /// Resolve a client-supplied relative path to a physical path inside the
    /// namespace root.
    ///
    /// Rejects absolute paths and any path containing a parent-directory
    /// segment before touching the filesystem. Does not check that the target
    /// exists; that is the caller's next step.
    pub fn resolve(&self, key: &str, relative: &str) -> StoreResult<PathBuf> {
        let ns = self.get(key)?;
        let normalized = normalize_relative(relative)?;
        Ok(ns.root.join(normalized))
    }
}

/// Normalize a relative path to forward slashes and validate it is safe to
/// join under a namespace root.
pub fn normalize_relative(relative: &str) -> StoreResult<String> {
    let normalized = relative.replace('\\', "/");

    if normalized.is_empty() {
        return Err(StoreError::invalid_path("empty path"));
    }
    if normalized.starts_with('/') {
        return Err(StoreError::invalid_path(relative));
    }
    // Windows drive or other scheme-like prefixes are never valid here.
    if normalized.contains(':') {
        return Err(StoreError::invalid_path(relative));
    }
    if normalized.split('/').any(|segment| segment == "..") {
        return Err(StoreError::invalid_path(relative));
    }

    Ok(normalized)
}
