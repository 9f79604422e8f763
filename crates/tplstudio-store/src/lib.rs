//! Versioned document store for structured configuration files.
//!
//! This crate is the core of tplstudio: it maps logical documents
//! (namespace key + relative path) to files inside revision-controlled
//! directory trees and records every write as an immutable, attributable
//! revision.
//!
//! # Example
//!
//! ```no_run
//! use tplstudio_store::{Namespace, NamespaceTable, VersionedStore};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let table = NamespaceTable::new([
//!     Namespace::new("device", "./devicetemplates", [".odt"]),
//! ]);
//! let store = VersionedStore::new(table);
//! store.bootstrap()?;
//!
//! store.save("device", "custom/switch.odt", "<template/>")?;
//! let history = store.history("device", "custom/switch.odt")?;
//! let original = store.version("device", "custom/switch.odt", &history[0].id)?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod error;
mod git;
mod namespace;
mod revision;
mod store;

pub use backend::{RevisionBackend, HISTORY_LIMIT};
pub use error::{CommitError, StoreError, StoreResult};
pub use git::{GitBackend, COMMITTER_EMAIL, COMMITTER_NAME};
pub use namespace::{Namespace, NamespaceTable};
pub use revision::Revision;
pub use store::{Document, SaveOutcome, VersionedStore};
