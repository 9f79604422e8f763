//! Git revision backend.
//!
//! Production [`RevisionBackend`] built on the git2 crate. Working with the
//! library directly (rather than shelling out to a git binary) keeps commit
//! staging, history walks and diff generation inside one engine with captured
//! diagnostics, and guarantees diffs are never delegated to environment-level
//! textconv filters or external diff tools.

use crate::backend::RevisionBackend;
use crate::error::{CommitError, StoreError, StoreResult};
use crate::revision::Revision;
use git2::{DiffFormat, DiffOptions, Oid, Repository, Signature, Sort};
use std::path::Path;
use tracing::debug;

/// Committer identity recorded on every revision. The store is the actor of
/// record; the identity is constant and distinct from any human author.
pub const COMMITTER_NAME: &str = "Template Studio";
/// Committer email paired with [`COMMITTER_NAME`].
pub const COMMITTER_EMAIL: &str = "tplstudio@local";

/// Git-based revision backend. Stateless; every operation opens the
/// repository it needs and releases it before returning.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitBackend;

impl GitBackend {
    /// Create a new git backend.
    pub fn new() -> Self {
        Self
    }

    fn open(&self, root: &Path) -> Result<Repository, git2::Error> {
        Repository::open(root)
    }

    fn signature(&self) -> Result<Signature<'static>, git2::Error> {
        Signature::now(COMMITTER_NAME, COMMITTER_EMAIL)
    }
}

/// Object id of `path` in the commit's tree, if the path existed there.
fn entry_id(commit: &git2::Commit, path: &Path) -> Option<Oid> {
    let tree = commit.tree().ok()?;
    tree.get_path(path).ok().map(|entry| entry.id())
}

/// Whether `commit` changed `path` relative to its parents. A root commit
/// counts when the path exists in it.
fn touches_path(commit: &git2::Commit, path: &Path) -> bool {
    let current = entry_id(commit, path);
    if commit.parent_count() == 0 {
        return current.is_some();
    }
    commit.parents().all(|parent| entry_id(&parent, path) != current)
}

/// Normalize path separators to git's canonical forward slash.
fn git_path(relative: &str) -> String {
    relative.replace('\\', "/")
}

impl RevisionBackend for GitBackend {
    fn ensure_initialized(&self, root: &Path) -> Result<(), CommitError> {
        if root.join(".git").exists() {
            return Ok(());
        }

        debug!(root = %root.display(), "initializing revision history");
        let repo = Repository::init(root)?;
        let mut config = repo.config()?;
        config.set_str("user.name", COMMITTER_NAME)?;
        config.set_str("user.email", COMMITTER_EMAIL)?;
        Ok(())
    }

    fn commit(&self, root: &Path, relative: &str, message: &str) -> Result<Revision, CommitError> {
        let repo = self.open(root)?;
        let relative = git_path(relative);

        let mut index = repo.index()?;
        index.add_path(Path::new(&relative))?;
        let tree_id = index.write_tree()?;

        let head = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        if let Some(head_commit) = &head {
            if head_commit.tree_id() == tree_id {
                return Err(CommitError::NothingToCommit);
            }
        }

        index.write()?;
        let tree = repo.find_tree(tree_id)?;
        let sig = self.signature()?;
        let parents: Vec<&git2::Commit> = head.iter().collect();

        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;
        let commit = repo.find_commit(oid)?;
        debug!(id = %oid, path = %relative, "committed revision");
        Ok(Revision::from_commit(&commit))
    }

    fn history(&self, root: &Path, relative: &str, limit: usize) -> StoreResult<Vec<Revision>> {
        // A missing or unborn repository means no history, not an error.
        let repo = match self.open(root) {
            Ok(repo) => repo,
            Err(_) => return Ok(Vec::new()),
        };
        if repo.head().is_err() {
            return Ok(Vec::new());
        }

        let relative = git_path(relative);
        let path = Path::new(&relative);

        let walk = || -> Result<Vec<Revision>, git2::Error> {
            let mut revwalk = repo.revwalk()?;
            revwalk.push_head()?;
            revwalk.set_sorting(Sort::TIME)?;

            let mut revisions = Vec::new();
            for oid in revwalk {
                let commit = repo.find_commit(oid?)?;
                if touches_path(&commit, path) {
                    revisions.push(Revision::from_commit(&commit));
                    if revisions.len() >= limit {
                        break;
                    }
                }
            }
            Ok(revisions)
        };

        walk().map_err(|e| StoreError::Commit(CommitError::Backend(e)))
    }

    fn read_at(&self, root: &Path, relative: &str, commit_id: &str) -> StoreResult<Vec<u8>> {
        let repo = self
            .open(root)
            .map_err(|_| StoreError::not_found(commit_id))?;
        let relative = git_path(relative);

        let commit = repo
            .revparse_single(commit_id)
            .ok()
            .and_then(|obj| obj.into_commit().ok())
            .ok_or_else(|| StoreError::not_found(format!("revision {commit_id}")))?;
        let tree = commit
            .tree()
            .map_err(|_| StoreError::not_found(format!("revision {commit_id}")))?;
        let entry = tree
            .get_path(Path::new(&relative))
            .map_err(|_| StoreError::not_found(format!("{relative} at {commit_id}")))?;
        let blob = repo
            .find_blob(entry.id())
            .map_err(|_| StoreError::not_found(format!("{relative} at {commit_id}")))?;

        Ok(blob.content().to_vec())
    }

    fn diff_at(&self, root: &Path, relative: &str, commit_id: &str) -> StoreResult<String> {
        let repo = self
            .open(root)
            .map_err(|_| StoreError::not_found(commit_id))?;
        let relative = git_path(relative);

        let commit = repo
            .revparse_single(commit_id)
            .ok()
            .and_then(|obj| obj.into_commit().ok())
            .ok_or_else(|| StoreError::not_found(format!("revision {commit_id}")))?;

        let produce = || -> Result<String, git2::Error> {
            let tree = commit.tree()?;
            let parent_tree = match commit.parents().next() {
                Some(parent) => Some(parent.tree()?),
                None => None,
            };

            let mut opts = DiffOptions::new();
            // Force raw-text handling so binary-leaning formats (.odt payloads,
            // XML with custom handlers) still produce a line diff.
            opts.pathspec(&relative).force_text(true);

            let diff =
                repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;

            let mut out = String::new();
            diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
                match line.origin() {
                    '+' | '-' | ' ' => out.push(line.origin()),
                    _ => {}
                }
                out.push_str(std::str::from_utf8(line.content()).unwrap_or(""));
                true
            })?;
            Ok(out)
        };

        produce().map_err(|_| StoreError::not_found(format!("diff for {commit_id}")))
    }
}
