//! Folder and media lifecycle.
//!
//! Creation and deletion of the resources themselves. Deletion cascades to
//! grants and blobs but deliberately not to notifications: stale tickets are
//! swept by the reconciler on the next listing.

use crate::error::{CoreError, CoreResult};
use crate::external::Collaborators;
use crate::models::{Folder, MediaItem};
use crate::policy;
use crate::storage::Storage;
use tracing::{debug, warn};

pub fn create_folder(storage: &Storage, owner_id: &str, name: &str) -> CoreResult<Folder> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("folder name is empty".to_string()));
    }
    let folder = Folder::new(owner_id.to_string(), name.trim().to_string());
    storage.folders.create(&folder)?;
    Ok(folder)
}

/// Fetch a folder and the media inside it that the principal may see.
pub fn get_folder(
    storage: &Storage,
    folder_id: &str,
    principal_id: &str,
) -> CoreResult<(Folder, Vec<MediaItem>)> {
    let folder = storage
        .folders
        .get(folder_id)?
        .ok_or_else(|| CoreError::NotFound(format!("folder {}", folder_id)))?;

    let folder_grants = storage.grants.get_for_grantee(folder_id, principal_id)?;
    if !policy::can_view_folder(&folder, principal_id, &folder_grants) {
        return Err(CoreError::Forbidden(format!(
            "{} may not view folder {}",
            principal_id, folder_id
        )));
    }

    // Folder access governs the listing; hidden items stay out of it for
    // everyone but the owner.
    let visible = storage
        .media
        .list_for_folder(folder_id)?
        .into_iter()
        .filter(|m| m.owner_id == principal_id || !m.is_hidden_for(principal_id))
        .collect();

    Ok((folder, visible))
}

/// Delete a folder and everything inside it. Owner only.
pub async fn delete_folder(
    storage: &Storage,
    collaborators: &Collaborators,
    folder_id: &str,
    principal_id: &str,
) -> CoreResult<()> {
    let folder = storage
        .folders
        .get(folder_id)?
        .ok_or_else(|| CoreError::NotFound(format!("folder {}", folder_id)))?;
    if !policy::can_delete(&folder.owner_id, principal_id) {
        return Err(CoreError::Forbidden(format!(
            "{} may not delete folder {}",
            principal_id, folder_id
        )));
    }

    for media in storage.media.list_for_folder(folder_id)? {
        delete_blob_best_effort(collaborators, &media.blob_id).await;
        storage.grants.delete_for_resource(&media.id)?;
    }
    let removed_media = storage.media.delete_for_folder(folder_id)?;
    let removed_grants = storage.grants.delete_for_resource(folder_id)?;
    storage.folders.delete(folder_id)?;
    debug!(folder_id, removed_media, removed_grants, "folder deleted");
    Ok(())
}

pub fn create_media(
    storage: &Storage,
    principal_id: &str,
    folder_id: &str,
    name: &str,
    blob_id: &str,
    url: &str,
) -> CoreResult<MediaItem> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation("media name is empty".to_string()));
    }
    let folder = storage
        .folders
        .get(folder_id)?
        .ok_or_else(|| CoreError::NotFound(format!("folder {}", folder_id)))?;

    let grants = storage.grants.get_for_grantee(folder_id, principal_id)?;
    if !policy::can_upload(&folder, principal_id, &grants) {
        return Err(CoreError::Forbidden(format!(
            "{} may not upload into folder {}",
            principal_id, folder_id
        )));
    }

    let media = MediaItem::new(
        folder.owner_id.clone(),
        folder.id.clone(),
        name.trim().to_string(),
        blob_id.to_string(),
        url.to_string(),
    );
    storage.media.create(&media)?;
    Ok(media)
}

/// Delete a media item, its grants and its blob. Owner only.
pub async fn delete_media(
    storage: &Storage,
    collaborators: &Collaborators,
    media_id: &str,
    principal_id: &str,
) -> CoreResult<()> {
    let media = storage
        .media
        .get(media_id)?
        .ok_or_else(|| CoreError::NotFound(format!("media {}", media_id)))?;
    if !policy::can_delete(&media.owner_id, principal_id) {
        return Err(CoreError::Forbidden(format!(
            "{} may not delete media {}",
            principal_id, media_id
        )));
    }

    delete_blob_best_effort(collaborators, &media.blob_id).await;
    storage.grants.delete_for_resource(media_id)?;
    storage.media.delete(&media)?;
    Ok(())
}

/// Permanently suppress a media item for one principal. Independent of
/// view-once state; the policy checks this before any grant.
pub fn hide_media(storage: &Storage, media_id: &str, principal_id: &str) -> CoreResult<MediaItem> {
    let mut media = storage
        .media
        .get(media_id)?
        .ok_or_else(|| CoreError::NotFound(format!("media {}", media_id)))?;
    media.hide_for(principal_id);
    storage.media.save(&media)?;
    Ok(media)
}

async fn delete_blob_best_effort(collaborators: &Collaborators, blob_id: &str) {
    match collaborators.blobs.delete(blob_id).await {
        Ok(_) => {}
        Err(err) => warn!(blob_id, error = %err, "blob delete failed, continuing"),
    }
}
