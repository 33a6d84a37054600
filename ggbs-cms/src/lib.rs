//! ggbs-cms library - site content service for the GGBS marketing site
//!
//! Serves the resolved site configuration, accepts admin edits and media
//! uploads, and records investor leads. Content is kept in sync between a
//! local SQLite cache and a hosted remote store, with compiled defaults as
//! the last resort.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod api;
pub mod cache;
pub mod error;
pub mod preview;
pub mod remote;
pub mod sync;

pub use error::{ApiError, ApiResult};

use admin::AdminGate;
use preview::PreviewStore;
use sync::{ConfigResolver, LeadDesk, SyncContext, UploadResolver};

/// Default request body limit for media uploads
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: ConfigResolver,
    pub uploads: UploadResolver,
    pub leads: LeadDesk,
    pub previews: PreviewStore,
    pub admin_gate: Arc<dyn AdminGate>,
    /// Server startup time (for uptime calculation)
    pub startup_time: DateTime<Utc>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Create new application state
    pub fn new(ctx: SyncContext, previews: PreviewStore, admin_gate: Arc<dyn AdminGate>) -> Self {
        Self {
            resolver: ConfigResolver::new(ctx.clone()),
            uploads: UploadResolver::new(ctx.clone(), previews.clone()),
            leads: LeadDesk::new(ctx),
            previews,
            admin_gate,
            startup_time: Utc::now(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

/// Build application router
///
/// Public routes: health, resolved content, lead submission, previews.
/// Everything under `/api/admin` passes through [`admin::require_admin`].
pub fn build_router(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route(
            "/api/admin/content",
            get(api::get_content).put(api::put_content),
        )
        .route(
            "/api/admin/connection",
            get(api::get_connection).put(api::put_connection),
        )
        .route(
            "/api/admin/media",
            post(api::upload_media).layer(DefaultBodyLimit::max(state.max_upload_bytes)),
        )
        .route("/api/admin/leads", get(api::list_leads))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin::require_admin,
        ));

    let public = Router::new()
        .route("/api/content", get(api::get_content))
        .route("/api/leads", post(api::submit_lead))
        .route("/preview/:id", get(api::serve_preview))
        .merge(api::health_routes());

    Router::new()
        .merge(admin_routes)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
