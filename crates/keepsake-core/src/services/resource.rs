//! Resource loading shared by the grant and share services.

use crate::error::{CoreError, CoreResult};
use crate::models::{Folder, MediaItem, ResourceRef, ResourceType};
use crate::storage::Storage;

/// A resolved resource document.
pub enum LoadedResource {
    Folder(Folder),
    Media(MediaItem),
}

impl LoadedResource {
    pub fn id(&self) -> &str {
        match self {
            LoadedResource::Folder(f) => &f.id,
            LoadedResource::Media(m) => &m.id,
        }
    }

    pub fn owner_id(&self) -> &str {
        match self {
            LoadedResource::Folder(f) => &f.owner_id,
            LoadedResource::Media(m) => &m.owner_id,
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            LoadedResource::Folder(_) => ResourceType::Folder,
            LoadedResource::Media(_) => ResourceType::Media,
        }
    }
}

/// Load the document a reference points at, or `NotFound`.
pub fn load(storage: &Storage, resource: &ResourceRef) -> CoreResult<LoadedResource> {
    match resource {
        ResourceRef::Folder { id } => storage
            .folders
            .get(id)?
            .map(LoadedResource::Folder)
            .ok_or_else(|| CoreError::NotFound(format!("folder {}", id))),
        ResourceRef::Media { id } => storage
            .media
            .get(id)?
            .map(LoadedResource::Media)
            .ok_or_else(|| CoreError::NotFound(format!("media {}", id))),
    }
}
