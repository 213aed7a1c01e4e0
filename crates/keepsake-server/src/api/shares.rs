//! Share API: the single entry point for every share variant.

use crate::api::{
    response::{ApiResponse, core_error},
    state::AppState,
};
use axum::{Json, extract::State, http::StatusCode};
use keepsake_core::services::share::{RecipientOutcome, ShareRequest, create_share};

/// Create a share for a batch of recipients.
///
/// The batch never fails as a whole once it validates: the response carries
/// one outcome per recipient, successes and failures side by side.
pub async fn post_share(
    State(state): State<AppState>,
    Json(request): Json<ShareRequest>,
) -> Result<Json<ApiResponse<Vec<RecipientOutcome>>>, (StatusCode, String)> {
    create_share(&state.storage, &state.collaborators, request)
        .await
        .map(|outcomes| Json(ApiResponse::ok(outcomes)))
        .map_err(core_error)
}
