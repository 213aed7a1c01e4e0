//! Media API: lifecycle, the policy-gated view, and per-principal hiding.

use crate::api::{
    folders::PrincipalQuery,
    response::{ApiResponse, core_error},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use keepsake_core::models::MediaItem;
use keepsake_core::services::{library, view};
use serde::Deserialize;

/// Upload has already happened against the blob store; this records the
/// resulting blob under a folder.
#[derive(Debug, Deserialize)]
pub struct CreateMediaRequest {
    pub principal: String,
    pub folder_id: String,
    pub name: String,
    pub blob_id: String,
    pub url: String,
}

pub async fn create_media(
    State(state): State<AppState>,
    Json(payload): Json<CreateMediaRequest>,
) -> Result<Json<ApiResponse<MediaItem>>, (StatusCode, String)> {
    library::create_media(
        &state.storage,
        &payload.principal,
        &payload.folder_id,
        &payload.name,
        &payload.blob_id,
        &payload.url,
    )
    .map(|media| Json(ApiResponse::ok(media)))
    .map_err(core_error)
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub principal: String,
}

/// View a media item as a principal. Consumes a view-once entry if that is
/// what admitted the viewer; afterwards the item is no longer viewable.
pub async fn view_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ViewRequest>,
) -> Result<Json<ApiResponse<view::MediaView>>, (StatusCode, String)> {
    view::view_media(&state.storage, &id, &payload.principal)
        .map(|v| Json(ApiResponse::ok(v)))
        .map_err(core_error)
}

/// Permanently hide a media item for the requesting principal.
pub async fn hide_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ViewRequest>,
) -> Result<Json<ApiResponse<MediaItem>>, (StatusCode, String)> {
    library::hide_media(&state.storage, &id, &payload.principal)
        .map(|media| Json(ApiResponse::ok(media)))
        .map_err(core_error)
}

/// Delete a media item, its grants and its blob. Owner only.
pub async fn delete_media(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PrincipalQuery>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, String)> {
    library::delete_media(&state.storage, &state.collaborators, &id, &query.principal)
        .await
        .map(|_| Json(ApiResponse::message("media deleted")))
        .map_err(core_error)
}
