//! Folder storage - byte-level API for folder documents.
//!
//! Keeps an owner index ("owner_id:folder_id" -> folder_id) so a principal's
//! folders can be listed without scanning the whole table. Grants for a
//! folder live in [`crate::GrantStorage`], not in the folder document itself.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

const FOLDER_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("folders");
/// Index table: "owner_id:folder_id" -> folder_id
const FOLDER_OWNER_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("folder_owner_index");

/// Low-level folder storage with byte-level API
#[derive(Debug, Clone)]
pub struct FolderStorage {
    db: Arc<Database>,
}

impl FolderStorage {
    /// Create a new FolderStorage instance
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(FOLDER_TABLE)?;
        write_txn.open_table(FOLDER_OWNER_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store raw folder data and maintain the owner index
    pub fn put_raw(&self, id: &str, owner_id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(FOLDER_TABLE)?;
            table.insert(id, data)?;

            let mut index_table = write_txn.open_table(FOLDER_OWNER_INDEX_TABLE)?;
            let index_key = format!("{}:{}", owner_id, id);
            index_table.insert(index_key.as_str(), id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get raw folder data by ID
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FOLDER_TABLE)?;

        if let Some(value) = table.get(id)? {
            Ok(Some(value.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// Check if a folder exists
    pub fn exists(&self, id: &str) -> Result<bool> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(FOLDER_TABLE)?;
        Ok(table.get(id)?.is_some())
    }

    /// List all folders owned by a principal
    pub fn list_for_owner_raw(&self, owner_id: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(FOLDER_OWNER_INDEX_TABLE)?;
        let folder_table = read_txn.open_table(FOLDER_TABLE)?;

        let prefix = format!("{}:", owner_id);
        let mut items = Vec::new();

        for item in index_table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                let folder_id = value.value();
                if let Some(data) = folder_table.get(folder_id)? {
                    items.push((folder_id.to_string(), data.value().to_vec()));
                }
            }
        }

        Ok(items)
    }

    /// Delete a folder by ID, returns true if it existed
    pub fn delete(&self, id: &str, owner_id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(FOLDER_TABLE)?;
            let existed = table.remove(id)?.is_some();

            let mut index_table = write_txn.open_table(FOLDER_OWNER_INDEX_TABLE)?;
            let index_key = format!("{}:{}", owner_id, id);
            index_table.remove(index_key.as_str())?;

            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_storage() -> (tempfile::TempDir, FolderStorage) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = FolderStorage::new(db).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_put_get_delete() {
        let (_dir, storage) = test_storage();

        assert!(!storage.exists("folder-001").unwrap());

        storage.put_raw("folder-001", "alice", b"folder data").unwrap();
        assert_eq!(storage.get_raw("folder-001").unwrap().unwrap(), b"folder data");
        assert!(storage.exists("folder-001").unwrap());

        assert!(storage.delete("folder-001", "alice").unwrap());
        assert!(!storage.delete("folder-001", "alice").unwrap());
        assert!(storage.get_raw("folder-001").unwrap().is_none());
    }

    #[test]
    fn test_owner_index() {
        let (_dir, storage) = test_storage();

        storage.put_raw("folder-001", "alice", b"a1").unwrap();
        storage.put_raw("folder-002", "alice", b"a2").unwrap();
        storage.put_raw("folder-003", "bob", b"b1").unwrap();

        assert_eq!(storage.list_for_owner_raw("alice").unwrap().len(), 2);
        assert_eq!(storage.list_for_owner_raw("bob").unwrap().len(), 1);

        storage.delete("folder-001", "alice").unwrap();
        assert_eq!(storage.list_for_owner_raw("alice").unwrap().len(), 1);
    }
}
