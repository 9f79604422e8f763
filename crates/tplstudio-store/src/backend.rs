//! Revision backend interface.

use crate::error::{CommitError, StoreResult};
use crate::revision::Revision;
use std::path::Path;

/// Default cap on history listings. Callers needing more must refine on a
/// narrower path or accept truncation.
pub const HISTORY_LIMIT: usize = 20;

/// Durable, attributable history for files under one root directory.
///
/// One implementation exists in production ([`GitBackend`](crate::GitBackend));
/// the trait boundary keeps it swappable for an in-memory test double.
pub trait RevisionBackend: Send + Sync {
    /// Idempotently create revision history at `root` if none exists, with a
    /// fixed committer identity. The store is the actor of record, not the
    /// document's editor.
    fn ensure_initialized(&self, root: &Path) -> Result<(), CommitError>;

    /// Stage exactly `relative` and create a new revision whose parent is the
    /// current head. Commits are never amended or rebased.
    fn commit(&self, root: &Path, relative: &str, message: &str) -> Result<Revision, CommitError>;

    /// Revisions touching `relative`, most recent first, bounded to `limit`.
    /// Empty when the path has no history or the backend has no commits yet.
    fn history(&self, root: &Path, relative: &str, limit: usize) -> StoreResult<Vec<Revision>>;

    /// Byte-faithful content of `relative` at `commit_id`. `NotFound` if the
    /// commit is unknown or the path did not exist at that revision.
    fn read_at(&self, root: &Path, relative: &str, commit_id: &str) -> StoreResult<Vec<u8>>;

    /// Unified diff of what `commit_id` did to `relative`, forced to raw text
    /// so non-text-friendly formats still diff. `NotFound` if the commit is
    /// unknown.
    fn diff_at(&self, root: &Path, relative: &str, commit_id: &str) -> StoreResult<String>;
}
