//! Investor lead endpoints

use crate::{ApiError, ApiResult, AppState};
use axum::{extract::State, http::StatusCode, Json};
use ggbs_common::{LeadRecord, NewLead};
use serde_json::{json, Value};

/// POST /api/leads
///
/// Accepted once validated, whether or not the remote store recorded it.
pub async fn submit_lead(
    State(state): State<AppState>,
    Json(payload): Json<NewLead>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let lead = payload
        .validate()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state.leads.submit_lead(&lead).await;

    Ok((StatusCode::ACCEPTED, Json(json!({ "accepted": true }))))
}

/// GET /api/admin/leads
pub async fn list_leads(State(state): State<AppState>) -> Json<Vec<LeadRecord>> {
    Json(state.leads.list_leads().await)
}
