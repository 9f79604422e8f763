//! Server state.

use crate::auth::AuthConfig;
use std::sync::Arc;
use tplstudio_store::VersionedStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// The versioned document store.
    pub store: Arc<VersionedStore>,
    /// Credentials for HTTP Basic Auth.
    pub auth: AuthConfig,
}

impl AppState {
    /// Create a new app state.
    pub fn new(store: Arc<VersionedStore>, auth: AuthConfig) -> Self {
        Self { store, auth }
    }
}
