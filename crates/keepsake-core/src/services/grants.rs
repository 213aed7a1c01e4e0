//! Grant management on folders and media.
//!
//! These operations do not authorize the caller; routes and the share
//! coordinator gate on the access policy before reaching them.

use crate::error::CoreResult;
use crate::models::{GrantMode, ResourceRef};
use crate::services::resource::{self, LoadedResource};
use crate::storage::Storage;
use tracing::debug;

/// Add (or update the mode of) a persistent grant. Idempotent: re-adding an
/// existing grantee never duplicates.
pub fn add_persistent_grant(
    storage: &Storage,
    resource: &ResourceRef,
    grantee_id: &str,
    mode: GrantMode,
) -> CoreResult<()> {
    let loaded = resource::load(storage, resource)?;
    storage
        .grants
        .upsert_persistent(loaded.resource_type(), loaded.id(), grantee_id, mode)?;
    Ok(())
}

/// Add a view-once entry for the grantee, enabling view-once sharing on the
/// resource if it was not already. No-op if an entry exists, consumed or not.
pub fn add_view_once_entry(
    storage: &Storage,
    resource: &ResourceRef,
    grantee_id: &str,
) -> CoreResult<()> {
    let loaded = resource::load(storage, resource)?;

    match loaded {
        LoadedResource::Folder(mut folder) => {
            if !folder.view_once_enabled {
                folder.view_once_enabled = true;
                folder.touch();
                storage.folders.save(&folder)?;
            }
            storage
                .grants
                .add_view_once(crate::models::ResourceType::Folder, &folder.id, grantee_id)?;
        }
        LoadedResource::Media(mut media) => {
            if !media.view_once_enabled {
                media.view_once_enabled = true;
                media.updated_at = chrono::Utc::now().timestamp();
                storage.media.save(&media)?;
            }
            storage
                .grants
                .add_view_once(crate::models::ResourceType::Media, &media.id, grantee_id)?;
        }
    }
    Ok(())
}

/// Remove a single view-once entry. Returns true if one existed.
pub fn remove_view_once_entry(
    storage: &Storage,
    resource: &ResourceRef,
    grantee_id: &str,
) -> CoreResult<bool> {
    let loaded = resource::load(storage, resource)?;
    Ok(storage
        .grants
        .remove(loaded.id(), grantee_id, GrantMode::ViewOnce)?)
}

/// Toggle view-once sharing on a resource.
///
/// Disabling is destructive: every view-once entry on the resource is
/// dropped, consumed or not. Persistent grants are untouched either way.
pub fn set_view_once_enabled(
    storage: &Storage,
    resource: &ResourceRef,
    enabled: bool,
) -> CoreResult<()> {
    let loaded = resource::load(storage, resource)?;

    match loaded {
        LoadedResource::Folder(mut folder) => {
            folder.view_once_enabled = enabled;
            folder.touch();
            storage.folders.save(&folder)?;
        }
        LoadedResource::Media(mut media) => {
            media.view_once_enabled = enabled;
            media.updated_at = chrono::Utc::now().timestamp();
            storage.media.save(&media)?;
        }
    }

    if !enabled {
        let cleared = storage.grants.clear_view_once(resource.id())?;
        debug!(
            resource_id = resource.id(),
            cleared, "view-once disabled, entries dropped"
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Folder, Grant};
    use tempfile::tempdir;

    fn test_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let storage = Storage::new(path.to_str().unwrap()).unwrap();
        (dir, storage)
    }

    fn seed_folder(storage: &Storage, owner: &str) -> Folder {
        let folder = Folder::new(owner.to_string(), "trip".to_string());
        storage.folders.create(&folder).unwrap();
        folder
    }

    fn grants_for(storage: &Storage, resource_id: &str, grantee: &str) -> Vec<Grant> {
        storage.grants.get_for_grantee(resource_id, grantee).unwrap()
    }

    #[test]
    fn test_add_persistent_grant_is_idempotent() {
        let (_dir, storage) = test_storage();
        let folder = seed_folder(&storage, "alice");
        let fref = ResourceRef::Folder { id: folder.id.clone() };

        add_persistent_grant(&storage, &fref, "bob", GrantMode::View).unwrap();
        add_persistent_grant(&storage, &fref, "bob", GrantMode::View).unwrap();

        assert_eq!(grants_for(&storage, &folder.id, "bob").len(), 1);
    }

    #[test]
    fn test_missing_resource_is_not_found() {
        let (_dir, storage) = test_storage();
        let fref = ResourceRef::Folder { id: "nope".to_string() };
        let err = add_persistent_grant(&storage, &fref, "bob", GrantMode::View).unwrap_err();
        assert!(matches!(err, crate::error::CoreError::NotFound(_)));
    }

    #[test]
    fn test_view_once_entry_enables_section() {
        let (_dir, storage) = test_storage();
        let folder = seed_folder(&storage, "alice");
        let fref = ResourceRef::Folder { id: folder.id.clone() };

        add_view_once_entry(&storage, &fref, "bob").unwrap();

        let reloaded = storage.folders.get(&folder.id).unwrap().unwrap();
        assert!(reloaded.view_once_enabled);
        assert_eq!(grants_for(&storage, &folder.id, "bob").len(), 1);
    }

    #[test]
    fn test_disabling_clears_entries_but_not_persistent_grants() {
        let (_dir, storage) = test_storage();
        let folder = seed_folder(&storage, "alice");
        let fref = ResourceRef::Folder { id: folder.id.clone() };

        add_persistent_grant(&storage, &fref, "bob", GrantMode::Upload).unwrap();
        add_view_once_entry(&storage, &fref, "bob").unwrap();
        add_view_once_entry(&storage, &fref, "carol").unwrap();

        set_view_once_enabled(&storage, &fref, false).unwrap();

        let reloaded = storage.folders.get(&folder.id).unwrap().unwrap();
        assert!(!reloaded.view_once_enabled);
        let remaining = storage.grants.list_for_resource(&folder.id).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].mode, GrantMode::Upload);
    }
}
