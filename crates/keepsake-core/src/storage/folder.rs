//! Typed folder storage wrapper.
//!
//! Wraps the byte-level API from keepsake-storage with the Folder model,
//! using JSON serialization.

use crate::models::Folder;
use anyhow::Result;
use redb::Database;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FolderStorage {
    inner: keepsake_storage::FolderStorage,
}

impl FolderStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            inner: keepsake_storage::FolderStorage::new(db)?,
        })
    }

    /// Create a new folder (fails if the id already exists).
    pub fn create(&self, folder: &Folder) -> Result<()> {
        if self.inner.exists(&folder.id)? {
            return Err(anyhow::anyhow!("Folder {} already exists", folder.id));
        }
        let json = serde_json::to_vec(folder)?;
        self.inner.put_raw(&folder.id, &folder.owner_id, &json)
    }

    pub fn get(&self, id: &str) -> Result<Option<Folder>> {
        if let Some(bytes) = self.inner.get_raw(id)? {
            Ok(Some(serde_json::from_slice(&bytes)?))
        } else {
            Ok(None)
        }
    }

    /// List all folders owned by a principal, most recent first.
    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Folder>> {
        let mut folders = Vec::new();
        for (_, bytes) in self.inner.list_for_owner_raw(owner_id)? {
            folders.push(serde_json::from_slice::<Folder>(&bytes)?);
        }
        folders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(folders)
    }

    /// Save a folder (create or update). The owner never changes, so the
    /// owner index entry is stable across saves.
    pub fn save(&self, folder: &Folder) -> Result<()> {
        let json = serde_json::to_vec(folder)?;
        self.inner.put_raw(&folder.id, &folder.owner_id, &json)
    }

    pub fn delete(&self, id: &str) -> Result<bool> {
        match self.get(id)? {
            Some(folder) => self.inner.delete(id, &folder.owner_id),
            None => Ok(false),
        }
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        self.inner.exists(id)
    }
}
