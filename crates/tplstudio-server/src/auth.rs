//! HTTP Basic Auth middleware.

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use base64::Engine;
use subtle::ConstantTimeEq;

/// Credentials checked by [`require_basic_auth`].
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// Middleware rejecting any request without valid Basic credentials.
pub async fn require_basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Basic "))
        .and_then(|encoded| base64::engine::general_purpose::STANDARD.decode(encoded).ok())
        .and_then(|decoded| String::from_utf8(decoded).ok())
        .map(|credentials| verify(&credentials, &state.auth))
        .unwrap_or(false);

    if authorized {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            [(header::WWW_AUTHENTICATE, "Basic realm=\"tplstudio\"")],
            Json(serde_json::json!({ "error": "Unauthorized" })),
        )
            .into_response()
    }
}

/// Constant-time comparison of `user:pass` credentials.
fn verify(credentials: &str, expected: &AuthConfig) -> bool {
    let Some((username, password)) = credentials.split_once(':') else {
        return false;
    };
    let user_ok = username.as_bytes().ct_eq(expected.username.as_bytes());
    let pass_ok = password.as_bytes().ct_eq(expected.password.as_bytes());
    bool::from(user_ok & pass_ok)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            username: "admin".to_string(),
            password: "changeme".to_string(),
        }
    }

    #[test]
    fn correct_credentials_verify() {
        assert!(verify("admin:changeme", &config()));
    }

    #[test]
    fn wrong_credentials_fail() {
        assert!(!verify("admin:wrong", &config()));
        assert!(!verify("other:changeme", &config()));
        assert!(!verify("admin", &config()));
        assert!(!verify("", &config()));
    }

    #[test]
    fn password_may_contain_colons() {
        let cfg = AuthConfig {
            username: "admin".to_string(),
            password: "a:b:c".to_string(),
        };
        assert!(verify("admin:a:b:c", &cfg));
    }
}
