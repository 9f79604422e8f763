//! HTTP routes for the server.
//!
//! Thin marshalling layer over [`tplstudio_store::VersionedStore`]: handlers
//! validate nothing themselves beyond request shape; path safety and
//! namespace checks live in the store.

use crate::{auth::require_basic_auth, state::AppState};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tplstudio_store::{Revision, SaveOutcome, StoreError};

/// Create the router with all routes. Everything under `/api` requires
/// Basic Auth; `/health` does not.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/templates", get(list_templates))
        .route("/template/{*path}", get(get_template).post(save_template))
        .route("/history/{*path}", get(get_history))
        .route("/version/{commit}/{*path}", get(get_version))
        .route("/diff/{commit}/{*path}", get(get_diff))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_basic_auth,
        ));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .with_state(state)
        .layer(cors)
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
    code: String,
}

impl ApiError {
    fn new(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: code.into(),
        }
    }
}

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

/// Map store errors onto HTTP status codes. Validation-class errors are
/// client faults; only write failures are server faults.
fn into_api_error(err: StoreError) -> (StatusCode, Json<ApiError>) {
    let (status, code) = match &err {
        StoreError::UnknownNamespace(_) => (StatusCode::BAD_REQUEST, "UNKNOWN_NAMESPACE"),
        StoreError::InvalidPath(_) => (StatusCode::BAD_REQUEST, "INVALID_PATH"),
        StoreError::InvalidEncoding(_) => (StatusCode::BAD_REQUEST, "INVALID_ENCODING"),
        StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        StoreError::WriteFailure(_) | StoreError::Commit(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
        }
    };
    (status, Json(ApiError::new(err.to_string(), code)))
}

/// `?type=` query parameter, defaulting to the device namespace.
#[derive(Debug, Deserialize)]
struct TypeQuery {
    #[serde(rename = "type", default = "default_type")]
    kind: String,
}

fn default_type() -> String {
    "device".to_string()
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "healthy": true,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List all documents in a namespace.
async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Vec<String>>> {
    state
        .store
        .list(&query.kind)
        .map(Json)
        .map_err(into_api_error)
}

#[derive(Debug, Serialize)]
struct TemplateResponse {
    filename: String,
    content: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Get the current content of a document.
async fn get_template(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<TemplateResponse>> {
    let doc = state.store.read(&query.kind, &path).map_err(into_api_error)?;
    Ok(Json(TemplateResponse {
        filename: doc.path,
        content: doc.content,
        kind: doc.namespace,
    }))
}

#[derive(Debug, Deserialize)]
struct SaveRequest {
    content: String,
}

#[derive(Debug, Serialize)]
struct SaveResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<Revision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

/// Save a document and record a revision.
///
/// A failed commit after a successful file write is still a 200, carrying a
/// warning payload instead of a revision.
async fn save_template(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<TypeQuery>,
    Json(req): Json<SaveRequest>,
) -> ApiResult<Json<SaveResponse>> {
    let outcome = state
        .store
        .save(&query.kind, &path, &req.content)
        .map_err(into_api_error)?;

    let response = match outcome {
        SaveOutcome::Committed { revision } => SaveResponse {
            message: "Saved and committed.".to_string(),
            revision: Some(revision),
            warning: None,
            details: None,
        },
        SaveOutcome::Unchanged => SaveResponse {
            message: "Saved; content unchanged.".to_string(),
            revision: None,
            warning: None,
            details: None,
        },
        SaveOutcome::SavedUncommitted { warning } => SaveResponse {
            message: "Saved.".to_string(),
            revision: None,
            warning: Some("Saved but revision commit failed".to_string()),
            details: Some(warning),
        },
    };
    Ok(Json(response))
}

/// Revision history of a document, newest first.
async fn get_history(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<Vec<Revision>>> {
    state
        .store
        .history(&query.kind, &path)
        .map(Json)
        .map_err(into_api_error)
}

/// Content of a document at a specific revision.
async fn get_version(
    State(state): State<AppState>,
    Path((commit, path)): Path<(String, String)>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let content = state
        .store
        .version(&query.kind, &path, &commit)
        .map_err(into_api_error)?;
    Ok(Json(serde_json::json!({ "content": content })))
}

/// Unified diff for a revision of a document.
async fn get_diff(
    State(state): State<AppState>,
    Path((commit, path)): Path<(String, String)>,
    Query(query): Query<TypeQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let diff = state
        .store
        .diff(&query.kind, &path, &commit)
        .map_err(into_api_error)?;
    Ok(Json(serde_json::json!({ "diff": diff })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthConfig;
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::TestServer;
    use base64::Engine;
    use serde_json::Value;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tplstudio_store::{Namespace, NamespaceTable, VersionedStore};

    fn setup() -> (TempDir, TestServer) {
        let dir = TempDir::new().unwrap();
        let table = NamespaceTable::new([
            Namespace::new("device", dir.path().join("devicetemplates"), [".odt"]),
            Namespace::new("snmp", dir.path().join("snmplibs"), [".oidlib", ".xml"]),
        ]);
        let store = VersionedStore::new(table);
        store.bootstrap().unwrap();

        let state = AppState::new(
            Arc::new(store),
            AuthConfig {
                username: "admin".to_string(),
                password: "changeme".to_string(),
            },
        );
        let server = TestServer::new(create_router(state)).unwrap();
        (dir, server)
    }

    fn auth_header() -> (HeaderName, HeaderValue) {
        let encoded = base64::engine::general_purpose::STANDARD.encode("admin:changeme");
        (
            HeaderName::from_static("authorization"),
            HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
        )
    }

    #[tokio::test]
    async fn health_requires_no_auth() {
        let (_dir, server) = setup();
        let res = server.get("/health").await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["healthy"], true);
    }

    #[tokio::test]
    async fn api_rejects_missing_credentials() {
        let (_dir, server) = setup();
        let res = server.get("/api/templates").await;
        res.assert_status(StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key("www-authenticate"));
    }

    #[tokio::test]
    async fn api_rejects_wrong_credentials() {
        let (_dir, server) = setup();
        let encoded = base64::engine::general_purpose::STANDARD.encode("admin:wrong");
        let res = server
            .get("/api/templates")
            .add_header(
                HeaderName::from_static("authorization"),
                HeaderValue::from_str(&format!("Basic {encoded}")).unwrap(),
            )
            .await;
        res.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_defaults_to_device_namespace() {
        let (_dir, server) = setup();
        let (name, value) = auth_header();
        let res = server.get("/api/templates").add_header(name, value).await;
        res.assert_status_ok();
        let body: Vec<String> = res.json();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn list_unknown_namespace_is_bad_request() {
        let (_dir, server) = setup();
        let (name, value) = auth_header();
        let res = server
            .get("/api/templates?type=invalid")
            .add_header(name, value)
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "UNKNOWN_NAMESPACE");
    }

    #[tokio::test]
    async fn save_then_read_and_list() {
        let (_dir, server) = setup();

        let (name, value) = auth_header();
        let res = server
            .post("/api/template/custom/switch.odt")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "content": "<template/>" }))
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["message"], "Saved and committed.");
        assert!(body["revision"]["id"].is_string());

        let res = server
            .get("/api/template/custom/switch.odt")
            .add_header(name.clone(), value.clone())
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["content"], "<template/>");
        assert_eq!(body["type"], "device");

        let res = server.get("/api/templates").add_header(name, value).await;
        let files: Vec<String> = res.json();
        assert_eq!(files, vec!["custom/switch.odt"]);
    }

    #[tokio::test]
    async fn traversal_path_is_rejected() {
        let (_dir, server) = setup();
        let (name, value) = auth_header();
        let res = server
            .post("/api/template/..%2Fescape.odt")
            .add_header(name, value)
            .json(&serde_json::json!({ "content": "<x/>" }))
            .await;
        res.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = res.json();
        assert_eq!(body["code"], "INVALID_PATH");
    }

    #[tokio::test]
    async fn missing_template_is_not_found() {
        let (_dir, server) = setup();
        let (name, value) = auth_header();
        let res = server
            .get("/api/template/missing.odt")
            .add_header(name, value)
            .await;
        res.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn history_version_and_diff_round_trip() {
        let (_dir, server) = setup();
        let (name, value) = auth_header();

        for content in ["<v1/>", "<v2/>"] {
            server
                .post("/api/template/s.odt")
                .add_header(name.clone(), value.clone())
                .json(&serde_json::json!({ "content": content }))
                .await
                .assert_status_ok();
        }

        let res = server
            .get("/api/history/s.odt")
            .add_header(name.clone(), value.clone())
            .await;
        res.assert_status_ok();
        let history: Vec<Value> = res.json();
        assert_eq!(history.len(), 2);
        let first = history[1]["id"].as_str().unwrap();
        let latest = history[0]["id"].as_str().unwrap();

        let res = server
            .get(&format!("/api/version/{first}/s.odt"))
            .add_header(name.clone(), value.clone())
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        assert_eq!(body["content"], "<v1/>");

        let res = server
            .get(&format!("/api/diff/{latest}/s.odt"))
            .add_header(name.clone(), value.clone())
            .await;
        res.assert_status_ok();
        let body: Value = res.json();
        let diff = body["diff"].as_str().unwrap();
        assert!(diff.contains("+<v2/>"));
        assert!(diff.contains("-<v1/>"));
    }

    #[tokio::test]
    async fn version_of_unknown_revision_is_not_found() {
        let (_dir, server) = setup();
        let (name, value) = auth_header();
        server
            .post("/api/template/s.odt")
            .add_header(name.clone(), value.clone())
            .json(&serde_json::json!({ "content": "<x/>" }))
            .await
            .assert_status_ok();

        let res = server
            .get("/api/version/deadbeefdeadbeefdeadbeefdeadbeefdeadbeef/s.odt")
            .add_header(name, value)
            .await;
        res.assert_status(StatusCode::NOT_FOUND);
    }
}
