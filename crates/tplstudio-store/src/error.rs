//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
///
/// `UnknownNamespace` and `InvalidPath` are rejected before any side effect
/// occurs. `WriteFailure` aborts a save before any commit is attempted.
/// `Commit` failures are recovered at the [`VersionedStore`](crate::VersionedStore)
/// boundary and never surfaced as a hard save failure.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The namespace key is not configured.
    #[error("Unknown namespace: {0}")]
    UnknownNamespace(String),

    /// The relative path is absolute or contains a parent-directory segment.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// File or revision not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// File content is not valid UTF-8.
    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    /// I/O error while writing a document.
    #[error("Write failed: {0}")]
    WriteFailure(#[from] std::io::Error),

    /// The revision backend rejected or could not complete a commit.
    #[error(transparent)]
    Commit(#[from] CommitError),
}

/// Errors from the revision backend's commit operation.
///
/// `NothingToCommit` is a legitimate outcome (the staged content is identical
/// to the current head) and is kept separate from genuine backend faults so
/// callers can tell the two apart.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Staging found no byte-level change against the current head.
    #[error("Nothing to commit: content unchanged")]
    NothingToCommit,

    /// The underlying revision-control engine failed. Raw diagnostic text is
    /// preserved for operability.
    #[error("Revision backend error: {0}")]
    Backend(#[from] git2::Error),

    /// I/O error while staging.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Create a not found error.
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// Create an invalid path error.
    pub fn invalid_path(path: impl Into<String>) -> Self {
        Self::InvalidPath(path.into())
    }
}
