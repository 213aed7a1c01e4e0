//! Folder API: lifecycle and the view-once toggle.

use crate::api::{
    response::{ApiResponse, core_error},
    state::AppState,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use keepsake_core::models::{Folder, MediaItem, ResourceRef};
use keepsake_core::services::{grants, library};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateFolderRequest {
    pub owner_id: String,
    pub name: String,
}

pub async fn create_folder(
    State(state): State<AppState>,
    Json(payload): Json<CreateFolderRequest>,
) -> Result<Json<ApiResponse<Folder>>, (StatusCode, String)> {
    library::create_folder(&state.storage, &payload.owner_id, &payload.name)
        .map(|folder| Json(ApiResponse::ok(folder)))
        .map_err(core_error)
}

#[derive(Debug, Deserialize)]
pub struct OwnerQuery {
    pub owner: String,
}

/// List the folders a principal owns.
pub async fn list_folders(
    State(state): State<AppState>,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Vec<Folder>>>, (StatusCode, String)> {
    state
        .storage
        .folders
        .list_for_owner(&query.owner)
        .map(|folders| Json(ApiResponse::ok(folders)))
        .map_err(|e| core_error(e.into()))
}

#[derive(Debug, Deserialize)]
pub struct PrincipalQuery {
    pub principal: String,
}

#[derive(Debug, Serialize)]
pub struct FolderView {
    pub folder: Folder,
    pub media: Vec<MediaItem>,
}

/// Fetch a folder and the media visible to the requesting principal.
pub async fn get_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PrincipalQuery>,
) -> Result<Json<ApiResponse<FolderView>>, (StatusCode, String)> {
    library::get_folder(&state.storage, &id, &query.principal)
        .map(|(folder, media)| Json(ApiResponse::ok(FolderView { folder, media })))
        .map_err(core_error)
}

/// Delete a folder and its contents. Owner only.
pub async fn delete_folder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PrincipalQuery>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, String)> {
    library::delete_folder(&state.storage, &state.collaborators, &id, &query.principal)
        .await
        .map(|_| Json(ApiResponse::message("folder deleted")))
        .map_err(core_error)
}

#[derive(Debug, Deserialize)]
pub struct ViewOnceToggleRequest {
    pub principal: String,
    pub enabled: bool,
}

/// Toggle view-once sharing on a folder. Disabling drops every view-once
/// entry on it.
pub async fn set_view_once(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ViewOnceToggleRequest>,
) -> Result<Json<ApiResponse<()>>, (StatusCode, String)> {
    let folder = state
        .storage
        .folders
        .get(&id)
        .map_err(|e| core_error(e.into()))?
        .ok_or((StatusCode::NOT_FOUND, format!("folder {} not found", id)))?;
    if folder.owner_id != payload.principal {
        return Err((
            StatusCode::FORBIDDEN,
            "only the owner may change sharing settings".to_string(),
        ));
    }

    grants::set_view_once_enabled(
        &state.storage,
        &ResourceRef::Folder { id },
        payload.enabled,
    )
    .map(|_| Json(ApiResponse::message("view-once setting updated")))
    .map_err(core_error)
}
