//! HTTP server for tplstudio.
//!
//! Provides the REST API over the versioned document store. This layer is
//! glue: request/response marshalling, Basic Auth, and status-code mapping.

pub mod auth;
pub mod routes;
pub mod state;

pub use auth::AuthConfig;
pub use routes::create_router;
pub use state::AppState;
