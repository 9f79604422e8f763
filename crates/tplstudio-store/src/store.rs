//! Versioned store façade.
//!
//! Combines the namespace table and the revision backend: `save` is
//! write-then-commit, `list` is a filtered scan of the namespace root, and
//! `history`/`version`/`diff` delegate to the backend after path resolution.

use crate::backend::{RevisionBackend, HISTORY_LIMIT};
use crate::error::{CommitError, StoreError, StoreResult};
use crate::git::GitBackend;
use crate::namespace::{Namespace, NamespaceTable};
use crate::revision::Revision;
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Mutex;
use tracing::{info, warn};
use walkdir::WalkDir;

/// A document read back from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Namespace key the document belongs to.
    pub namespace: String,
    /// Forward-slash relative path inside the namespace.
    pub path: String,
    /// Text payload. Validity as XML/JSON is the caller's concern.
    pub content: String,
}

/// Outcome of a save. The file write has succeeded in every variant; only the
/// revision record differs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SaveOutcome {
    /// Written and recorded as a new revision.
    Committed { revision: Revision },
    /// Written, but byte-identical to the current head; no new revision.
    Unchanged,
    /// Written, but the revision backend failed. History lags file content
    /// until the next successful commit.
    SavedUncommitted { warning: String },
}

/// The versioned document store.
///
/// Owns a fixed namespace table and one revision backend scoped per namespace
/// root. Write+commit pairs are serialized per namespace so concurrent saves
/// cannot race the backend's staging index; reads take no lock.
pub struct VersionedStore<B = GitBackend> {
    namespaces: NamespaceTable,
    backend: B,
    write_locks: BTreeMap<String, Mutex<()>>,
}

impl VersionedStore<GitBackend> {
    /// Create a store over the production git backend.
    pub fn new(namespaces: NamespaceTable) -> Self {
        Self::with_backend(namespaces, GitBackend::new())
    }
}

impl<B: RevisionBackend> VersionedStore<B> {
    /// Create a store with an explicit revision backend.
    pub fn with_backend(namespaces: NamespaceTable, backend: B) -> Self {
        let write_locks = namespaces
            .iter()
            .map(|ns| (ns.key.clone(), Mutex::new(())))
            .collect();
        Self {
            namespaces,
            backend,
            write_locks,
        }
    }

    /// The configured namespace table.
    pub fn namespaces(&self) -> &NamespaceTable {
        &self.namespaces
    }

    /// Ensure every namespace root and its revision history exist.
    ///
    /// Failing to create a root directory is fatal: no file operation can
    /// ever succeed without it. A failed history init is logged and the
    /// namespace degrades to file-write-only.
    pub fn bootstrap(&self) -> StoreResult<()> {
        for ns in self.namespaces.iter() {
            std::fs::create_dir_all(&ns.root)?;
            if let Err(e) = self.backend.ensure_initialized(&ns.root) {
                warn!(
                    namespace = %ns.key,
                    root = %ns.root.display(),
                    error = %e,
                    "revision history init failed; namespace runs unversioned"
                );
            }
        }
        Ok(())
    }

    /// All documents in a namespace, as sorted forward-slash relative paths.
    ///
    /// Walks the root recursively, skipping the revision control directory
    /// and anything outside the extension allow-list. A root that does not
    /// exist yet yields an empty list.
    pub fn list(&self, namespace: &str) -> StoreResult<Vec<String>> {
        let ns = self.namespaces.get(namespace)?;
        if !ns.root.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&ns.root)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(namespace = %ns.key, error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if !ns.matches(&name) {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&ns.root) {
                files.push(rel.to_string_lossy().replace(std::path::MAIN_SEPARATOR, "/"));
            }
        }

        files.sort();
        Ok(files)
    }

    /// Read the current content of a document.
    ///
    /// The payload is decoded strictly as UTF-8; undecodable bytes are an
    /// `InvalidEncoding` error, never silently transcoded or truncated.
    pub fn read(&self, namespace: &str, relative: &str) -> StoreResult<Document> {
        let path = self.namespaces.resolve(namespace, relative)?;

        let bytes = std::fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StoreError::not_found(relative)
            } else {
                StoreError::WriteFailure(e)
            }
        })?;
        let content = String::from_utf8(bytes)
            .map_err(|_| StoreError::InvalidEncoding(relative.to_string()))?;

        Ok(Document {
            namespace: namespace.to_string(),
            path: relative.to_string(),
            content,
        })
    }

    /// Write a document and record a revision.
    ///
    /// The write is atomic (temp file + rename in the target directory) so a
    /// crash never leaves a partial payload. A failed commit after a
    /// successful write is reported as `SavedUncommitted`, not as an error.
    pub fn save(&self, namespace: &str, relative: &str, content: &str) -> StoreResult<SaveOutcome> {
        let ns = self.namespaces.get(namespace)?;
        let path = self.namespaces.resolve(namespace, relative)?;

        let _guard = self
            .write_locks
            .get(namespace)
            .map(|lock| lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_atomic(&path, content.as_bytes())?;

        let message = format!("Update {relative} via Template Studio");
        match self.backend.commit(&ns.root, relative, &message) {
            Ok(revision) => {
                info!(namespace = %namespace, path = %relative, id = %revision.short_id, "saved and committed");
                Ok(SaveOutcome::Committed { revision })
            }
            Err(CommitError::NothingToCommit) => Ok(SaveOutcome::Unchanged),
            Err(e) => {
                warn!(namespace = %namespace, path = %relative, error = %e, "saved but commit failed");
                Ok(SaveOutcome::SavedUncommitted {
                    warning: e.to_string(),
                })
            }
        }
    }

    /// Revision history for a document, newest first, capped at 20 entries.
    pub fn history(&self, namespace: &str, relative: &str) -> StoreResult<Vec<Revision>> {
        let ns = self.namespaces.get(namespace)?;
        let relative = crate::namespace::normalize_relative(relative)?;
        self.backend.history(&ns.root, &relative, HISTORY_LIMIT)
    }

    /// A document's content at a specific revision, even after later
    /// uncommitted overwrites.
    pub fn version(&self, namespace: &str, relative: &str, commit_id: &str) -> StoreResult<String> {
        let ns = self.namespaces.get(namespace)?;
        let relative = crate::namespace::normalize_relative(relative)?;
        let bytes = self.backend.read_at(&ns.root, &relative, commit_id)?;
        String::from_utf8(bytes).map_err(|_| StoreError::InvalidEncoding(relative))
    }

    /// Unified diff text for what a revision did to a document.
    pub fn diff(&self, namespace: &str, relative: &str, commit_id: &str) -> StoreResult<String> {
        let ns = self.namespaces.get(namespace)?;
        let relative = crate::namespace::normalize_relative(relative)?;
        self.backend.diff_at(&ns.root, &relative, commit_id)
    }

    /// Look up a namespace by key (for callers that need root/extensions).
    pub fn namespace(&self, key: &str) -> StoreResult<&Namespace> {
        self.namespaces.get(key)
    }
}

/// Write `bytes` to `path` atomically: stage in a temp file in the same
/// directory, then rename over the target.
fn write_atomic(path: &std::path::Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    tmp.persist(path)
        .map_err(|e| StoreError::WriteFailure(e.error))?;
    Ok(())
}
