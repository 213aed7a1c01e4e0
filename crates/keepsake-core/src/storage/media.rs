//! Typed media storage wrapper.

use crate::models::MediaItem;
use anyhow::Result;
use redb::Database;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct MediaStorage {
    inner: keepsake_storage::MediaStorage,
}

impl MediaStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            inner: keepsake_storage::MediaStorage::new(db)?,
        })
    }

    /// Create a new media item (fails if the id already exists).
    pub fn create(&self, item: &MediaItem) -> Result<()> {
        if self.inner.exists(&item.id)? {
            return Err(anyhow::anyhow!("Media item {} already exists", item.id));
        }
        let json = serde_json::to_vec(item)?;
        self.inner.put_raw(&item.id, &item.folder_id, &json)
    }

    pub fn get(&self, id: &str) -> Result<Option<MediaItem>> {
        if let Some(bytes) = self.inner.get_raw(id)? {
            Ok(Some(serde_json::from_slice(&bytes)?))
        } else {
            Ok(None)
        }
    }

    /// List all media in a folder, most recent first.
    pub fn list_for_folder(&self, folder_id: &str) -> Result<Vec<MediaItem>> {
        let mut items = Vec::new();
        for (_, bytes) in self.inner.list_for_folder_raw(folder_id)? {
            items.push(serde_json::from_slice::<MediaItem>(&bytes)?);
        }
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    /// Save a media item (create or update).
    pub fn save(&self, item: &MediaItem) -> Result<()> {
        let json = serde_json::to_vec(item)?;
        self.inner.put_raw(&item.id, &item.folder_id, &json)
    }

    pub fn delete(&self, item: &MediaItem) -> Result<bool> {
        self.inner.delete(&item.id, &item.folder_id)
    }

    /// Delete every media item in a folder, returns the number deleted.
    pub fn delete_for_folder(&self, folder_id: &str) -> Result<u32> {
        self.inner.delete_for_folder(folder_id)
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id)
    }
}
