//! Notification storage - byte-level API for notification records.
//!
//! Notifications are looked up by recipient far more often than by id, so a
//! recipient index ("recipient_id:notification_id" -> notification_id) is
//! maintained alongside the main table.

use anyhow::Result;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};
use std::sync::Arc;

const NOTIFICATION_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("notifications");
/// Index table: "recipient_id:notification_id" -> notification_id
const RECIPIENT_INDEX_TABLE: TableDefinition<&str, &str> =
    TableDefinition::new("notification_recipient_index");

/// Low-level notification storage with byte-level API
#[derive(Debug, Clone)]
pub struct NotificationStorage {
    db: Arc<Database>,
}

impl NotificationStorage {
    /// Create a new NotificationStorage instance
    pub fn new(db: Arc<Database>) -> Result<Self> {
        let write_txn = db.begin_write()?;
        write_txn.open_table(NOTIFICATION_TABLE)?;
        write_txn.open_table(RECIPIENT_INDEX_TABLE)?;
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Store raw notification data and maintain the recipient index
    pub fn put_raw(&self, id: &str, recipient_id: &str, data: &[u8]) -> Result<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(NOTIFICATION_TABLE)?;
            table.insert(id, data)?;

            let mut index_table = write_txn.open_table(RECIPIENT_INDEX_TABLE)?;
            let index_key = format!("{}:{}", recipient_id, id);
            index_table.insert(index_key.as_str(), id)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get raw notification data by ID
    pub fn get_raw(&self, id: &str) -> Result<Option<Vec<u8>>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NOTIFICATION_TABLE)?;

        if let Some(value) = table.get(id)? {
            Ok(Some(value.value().to_vec()))
        } else {
            Ok(None)
        }
    }

    /// List all notifications for a recipient
    pub fn list_for_recipient_raw(&self, recipient_id: &str) -> Result<Vec<(String, Vec<u8>)>> {
        let read_txn = self.db.begin_read()?;
        let index_table = read_txn.open_table(RECIPIENT_INDEX_TABLE)?;
        let notification_table = read_txn.open_table(NOTIFICATION_TABLE)?;

        let prefix = format!("{}:", recipient_id);
        let mut items = Vec::new();

        for item in index_table.iter()? {
            let (key, value) = item?;
            if key.value().starts_with(&prefix) {
                let id = value.value();
                if let Some(data) = notification_table.get(id)? {
                    items.push((id.to_string(), data.value().to_vec()));
                }
            }
        }

        Ok(items)
    }

    /// Delete a notification by ID, returns true if it existed
    pub fn delete(&self, id: &str, recipient_id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let existed = {
            let mut table = write_txn.open_table(NOTIFICATION_TABLE)?;
            let existed = table.remove(id)?.is_some();

            let mut index_table = write_txn.open_table(RECIPIENT_INDEX_TABLE)?;
            let index_key = format!("{}:{}", recipient_id, id);
            index_table.remove(index_key.as_str())?;

            existed
        };
        write_txn.commit()?;
        Ok(existed)
    }

    /// Count all notifications
    pub fn count(&self) -> Result<usize> {
        use redb::ReadableTableMetadata;
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(NOTIFICATION_TABLE)?;
        Ok(table.len()? as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_storage() -> (tempfile::TempDir, NotificationStorage) {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db = Arc::new(Database::create(db_path).unwrap());
        let storage = NotificationStorage::new(db).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_put_get_delete() {
        let (_dir, storage) = test_storage();

        storage.put_raw("notif-001", "alice", b"data").unwrap();
        assert_eq!(storage.get_raw("notif-001").unwrap().unwrap(), b"data");

        assert!(storage.delete("notif-001", "alice").unwrap());
        assert!(storage.get_raw("notif-001").unwrap().is_none());
        assert!(storage.list_for_recipient_raw("alice").unwrap().is_empty());
    }

    #[test]
    fn test_recipient_index() {
        let (_dir, storage) = test_storage();

        storage.put_raw("notif-001", "alice", b"a1").unwrap();
        storage.put_raw("notif-002", "alice", b"a2").unwrap();
        storage.put_raw("notif-003", "bob", b"b1").unwrap();

        assert_eq!(storage.list_for_recipient_raw("alice").unwrap().len(), 2);
        assert_eq!(storage.list_for_recipient_raw("bob").unwrap().len(), 1);
        assert_eq!(storage.count().unwrap(), 3);
    }
}
