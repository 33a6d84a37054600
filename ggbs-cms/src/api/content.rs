//! Site content and remote connection endpoints
//!
//! - `GET /api/content` (public) and `GET /api/admin/content`: resolved configuration
//! - `PUT /api/admin/content`: persist locally, then globally
//! - `GET|PUT /api/admin/connection`: credential status and update

use crate::sync::ConnectionStatus;
use crate::{ApiResult, AppState};
use axum::{extract::State, Json};
use ggbs_common::SiteConfiguration;
use serde::{Deserialize, Serialize};

/// GET /api/content
pub async fn get_content(State(state): State<AppState>) -> Json<SiteConfiguration> {
    Json(state.resolver.resolve_configuration().await)
}

#[derive(Debug, Serialize)]
pub struct SaveContentResponse {
    /// Always "global"; local-only saves are reported as errors
    pub saved: &'static str,
}

/// PUT /api/admin/content
///
/// **Errors:**
/// - 409 SAVED_LOCALLY_ONLY: no remote credentials; the local cache was updated
/// - 502 REMOTE_UNAVAILABLE / REMOTE_REJECTED: remote save failed; the local cache was updated
/// - 400 EPHEMERAL_REFERENCE: a slot still points at a temporary preview; nothing was written
pub async fn put_content(
    State(state): State<AppState>,
    Json(content): Json<SiteConfiguration>,
) -> ApiResult<Json<SaveContentResponse>> {
    state.resolver.persist_configuration(&content).await?;
    Ok(Json(SaveContentResponse { saved: "global" }))
}

/// Request payload for PUT /api/admin/connection
#[derive(Debug, Deserialize)]
pub struct SetConnectionRequest {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct SetConnectionResponse {
    /// Whether the stored pair has both halves
    pub usable: bool,
    /// Connection state after the update
    pub status: ConnectionStatus,
}

/// GET /api/admin/connection
pub async fn get_connection(State(state): State<AppState>) -> Json<ConnectionStatus> {
    Json(state.resolver.connection_status().await)
}

/// PUT /api/admin/connection
///
/// Content is not reloaded; the next resolution uses the new pair.
pub async fn put_connection(
    State(state): State<AppState>,
    Json(payload): Json<SetConnectionRequest>,
) -> ApiResult<Json<SetConnectionResponse>> {
    let usable = state
        .resolver
        .set_credentials(&payload.endpoint, &payload.token)
        .await?;

    Ok(Json(SetConnectionResponse {
        usable,
        status: state.resolver.connection_status().await,
    }))
}
