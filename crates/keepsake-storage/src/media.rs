//! Media storage - byte-level API for media item persistence.
//!
//! Keeps a secondary folder index so a folder's media can be listed (and
//! cascade-deleted) without scanning the whole table.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

const MEDIA_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("media");
/// Index table: "folder_id:media_id" -> media_id
const MEDIA_FOLDER_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("media_folder_index");

/// Low-level media storage with byte-level API
#[derive(Debug, Clone)]
pub struct MediaStorage {
    db: Arc<Database>,
}

impl MediaStorage {
    /// Create a new MediaStorage instance
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(MEDIA_TABLE)?;
        write_txn.open_table(MEDIA_FOLDER_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store raw media data and maintain the folder index
    pub fn put_raw(&self, id: &str, folder_id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MEDIA_TABLE)?;
            table.insert(id, data)?;

            let mut index_table = write_txn.open_table(MEDIA_FOLDER_INDEX_TABLE)?;
            let index_key = format!("{}:{}", folder_id, id);
            index_table.insert(index_key.as_str(), id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get raw media data by ID
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEDIA_TABLE)?;

        if let Some(value) = table.get(id)? {
            Ok(Some(value.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// Check if a media item exists
    pub fn exists(&self, id: &str) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(MEDIA_TABLE)?;
        Ok(table.get(id)?.is_some())
    }

    /// List all media in a specific folder
    pub fn list_for_folder_raw(&self, folder_id: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(MEDIA_FOLDER_INDEX_TABLE)?;
        let media_table = read_txn.open_table(MEDIA_TABLE)?;

        let prefix = format!("{}:", folder_id);
        let mut items = Vec::new();

        for item in index_table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                let media_id = value.value();
                if let Some(data) = media_table.get(media_id)? {
                    items.push((media_id.to_string(), data.value().to_vec()));
                }
            }
        }

        Ok(items)
    }

    /// Delete a media item by ID, returns true if it existed
    pub fn delete(&self, id: &str, folder_id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(MEDIA_TABLE)?;
            let existed = table.remove(id)?.is_some();

            let mut index_table = write_txn.open_table(MEDIA_FOLDER_INDEX_TABLE)?;
            let index_key = format!("{}:{}", folder_id, id);
            index_table.remove(index_key.as_str())?;

            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Delete all media in a folder, returns the number deleted
    pub fn delete_for_folder(&self, folder_id: &str) -> Result<u32> {
        let items = self.list_for_folder_raw(folder_id)?;
        let count = items.len() as u32;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(MEDIA_TABLE)?;
            let mut index_table = write_txn.open_table(MEDIA_FOLDER_INDEX_TABLE)?;
            for (id, _) in &items {
                table.remove(id.as_str())?;
                let index_key = format!("{}:{}", folder_id, id);
                index_table.remove(index_key.as_str())?;
            }
        }
        write_txn.commit()?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_storage() -> (tempfile::TempDir, MediaStorage) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = MediaStorage::new(db).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_put_and_get_raw() {
        let (_dir, storage) = test_storage();

        storage.put_raw("media-001", "folder-a", b"bytes").unwrap();
        assert_eq!(storage.get_raw("media-001").unwrap().unwrap(), b"bytes");
        assert!(storage.exists("media-001").unwrap());
    }

    #[test]
    fn test_folder_index() {
        let (_dir, storage) = test_storage();

        storage.put_raw("media-001", "folder-a", b"a1").unwrap();
        storage.put_raw("media-002", "folder-a", b"a2").unwrap();
        storage.put_raw("media-003", "folder-b", b"b1").unwrap();

        let in_a = storage.list_for_folder_raw("folder-a").unwrap();
        assert_eq!(in_a.len(), 2);

        let deleted = storage.delete_for_folder("folder-a").unwrap();
        assert_eq!(deleted, 2);
        assert!(storage.list_for_folder_raw("folder-a").unwrap().is_empty());
        assert!(storage.exists("media-003").unwrap());
    }

    #[test]
    fn test_delete_removes_index_entry() {
        let (_dir, storage) = test_storage();

        storage.put_raw("media-001", "folder-a", b"a1").unwrap();
        assert!(storage.delete("media-001", "folder-a").unwrap());
        assert!(!storage.delete("media-001", "folder-a").unwrap());
        assert!(storage.list_for_folder_raw("folder-a").unwrap().is_empty());
    }
}
