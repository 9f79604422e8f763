//! Revision metadata.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// An immutable, attributed snapshot of one document at a point in time.
///
/// Created exactly once at commit time; never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Revision {
    /// Full commit hash.
    pub id: String,
    /// Commit hash (short).
    pub short_id: String,
    /// Author name.
    pub author: String,
    /// Author email.
    pub email: String,
    /// Commit timestamp (ISO 8601 with explicit offset).
    pub timestamp: String,
    /// Commit message (first line).
    pub message: String,
}

impl Revision {
    pub(crate) fn from_commit(commit: &git2::Commit) -> Self {
        let time = commit.time();
        let offset = FixedOffset::east_opt(time.offset_minutes() * 60).unwrap_or_else(|| Utc.fix());
        let timestamp = DateTime::<Utc>::from_timestamp(time.seconds(), 0)
            .map(|dt| dt.with_timezone(&offset).to_rfc3339())
            .unwrap_or_default();

        Self {
            id: commit.id().to_string(),
            short_id: commit.id().to_string().chars().take(7).collect(),
            author: commit.author().name().unwrap_or("").to_string(),
            email: commit.author().email().unwrap_or("").to_string(),
            timestamp,
            message: commit.summary().unwrap_or("").to_string(),
        }
    }
}
