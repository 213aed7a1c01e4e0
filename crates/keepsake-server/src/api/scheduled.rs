//! Scheduled-operation API: listing with derived status, and immediate
//! execution.

use crate::api::{
    response::{ApiResponse, core_error},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use keepsake_core::services::schedule::{self, ScheduledOperation};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ScheduledQuery {
    pub recipient: String,
}

pub async fn list_scheduled(
    State(state): State<AppState>,
    Query(query): Query<ScheduledQuery>,
) -> Result<Json<ApiResponse<Vec<ScheduledOperation>>>, (StatusCode, String)> {
    schedule::list_for_recipient(&state.storage, &query.recipient)
        .map(|ops| Json(ApiResponse::ok(ops)))
        .map_err(core_error)
}

/// Execute a pending operation now. Idempotent.
pub async fn execute_scheduled(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ScheduledOperation>>, (StatusCode, String)> {
    schedule::execute_now(&state.storage, &id)
        .map(|op| Json(ApiResponse::ok(op)))
        .map_err(core_error)
}
