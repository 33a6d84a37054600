//! Admin gate
//!
//! Admin routes require HTTP Basic credentials checked by an [`AdminGate`].
//! The shipped gate compares against a configured plaintext pair. This is a
//! known-insecure pattern kept behind the trait so a real identity provider
//! can replace it without touching the resolvers.

use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use ggbs_common::config::AdminConfig;
use serde_json::json;
use tracing::warn;

/// Compiled fallback used when no password is configured
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "password123";

pub trait AdminGate: Send + Sync {
    fn authorize(&self, username: &str, password: &str) -> bool;
}

/// Fixed username/password comparison
pub struct StaticCredentialGate {
    username: String,
    password: String,
}

impl StaticCredentialGate {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Gate from `[admin]` config, falling back to the compiled pair
    pub fn from_config(config: &AdminConfig) -> Self {
        match config.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => Self::new(config.username.clone(), password),
            None => {
                warn!(
                    "No admin password configured; using the compiled default credentials. \
                     Set [admin] password in the config file."
                );
                Self::new(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
            }
        }
    }
}

impl AdminGate for StaticCredentialGate {
    /// The entered username is trimmed; the password is compared as-is
    fn authorize(&self, username: &str, password: &str) -> bool {
        username.trim() == self.username && password == self.password
    }
}

/// Decode `Authorization: Basic <base64(user:pass)>`
pub fn parse_basic_auth(value: &str) -> Option<(String, String)> {
    let encoded = value.strip_prefix("Basic ")?.trim();
    let decoded = STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Middleware guarding admin routes
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let credentials = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_basic_auth);

    match credentials {
        Some((username, password)) if state.admin_gate.authorize(&username, &password) => {
            next.run(request).await
        }
        Some((username, _)) => {
            warn!(%username, "Admin authentication failed");
            unauthorized()
        }
        None => unauthorized(),
    }
}

fn unauthorized() -> Response {
    let body = Json(json!({
        "error": {
            "code": "UNAUTHORIZED",
            "message": "Admin credentials required",
        }
    }));

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"ggbs-admin\"")],
        body,
    )
        .into_response()
}
