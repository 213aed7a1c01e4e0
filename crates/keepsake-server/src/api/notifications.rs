//! Notification API: reconciled listing and the read/viewed transitions.

use crate::api::{
    response::{ApiResponse, core_error},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use keepsake_core::models::{NotificationKind, NotificationRecord};
use keepsake_core::services::{reconcile, view};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    pub recipient: String,
    #[serde(default)]
    pub kind: Option<NotificationKind>,
    #[serde(default)]
    pub include_viewed: bool,
    #[serde(default)]
    pub include_expired: bool,
}

/// List a recipient's notifications, reconciled against current grant and
/// resource state. Stale records are deleted as a side effect.
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<NotificationQuery>,
) -> Result<Json<ApiResponse<Vec<NotificationRecord>>>, (StatusCode, String)> {
    let filter = reconcile::NotificationFilter {
        kind: query.kind,
        include_viewed: query.include_viewed,
        include_expired: query.include_expired,
    };
    reconcile::list_valid(&state.storage, &query.recipient, &filter)
        .map(|records| Json(ApiResponse::ok(records)))
        .map_err(core_error)
}

#[derive(Debug, Deserialize)]
pub struct RecipientBody {
    pub recipient: String,
}

/// Mark a notification read.
pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RecipientBody>,
) -> Result<Json<ApiResponse<NotificationRecord>>, (StatusCode, String)> {
    view::mark_read(&state.storage, &id, &body.recipient)
        .map(|record| Json(ApiResponse::ok(record)))
        .map_err(core_error)
}

/// Mark a notification viewed. For view-once tickets this consumes the grant
/// and hides the media for the recipient.
pub async fn mark_viewed(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<RecipientBody>,
) -> Result<Json<ApiResponse<view::ViewedOutcome>>, (StatusCode, String)> {
    view::mark_viewed(&state.storage, &id, &body.recipient)
        .map(|outcome| Json(ApiResponse::ok(outcome)))
        .map_err(core_error)
}

#[derive(Debug, Deserialize)]
pub struct RecipientQuery {
    pub recipient: String,
}

/// Delete a notification explicitly. Recipient only.
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<RecipientQuery>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, String)> {
    view::delete_notification(&state.storage, &id, &query.recipient)
        .map(|_| Json(ApiResponse::message("notification deleted")))
        .map_err(core_error)
}
