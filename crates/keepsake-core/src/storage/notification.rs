//! Typed notification storage wrapper.

use crate::models::NotificationRecord;
use anyhow::Result;
use redb::Database;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct NotificationStorage {
    inner: keepsake_storage::NotificationStorage,
}

impl NotificationStorage {
    pub fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            inner: keepsake_storage::NotificationStorage::new(db)?,
        })
    }

    pub fn get(&self, id: &str) -> Result<Option<NotificationRecord>> {
        if let Some(bytes) = self.inner.get_raw(id)? {
            Ok(Some(serde_json::from_slice(&bytes)?))
        } else {
            Ok(None)
        }
    }

    /// List all notifications for a recipient, most recent first.
    ///
    /// Raw listing; callers that serve recipients should go through the
    /// reconciler instead, which drops stale records.
    pub fn list_for_recipient(&self, recipient_id: &str) -> Result<Vec<NotificationRecord>> {
        let mut records = Vec::new();
        for (_, bytes) in self.inner.list_for_recipient_raw(recipient_id)? {
            records.push(serde_json::from_slice::<NotificationRecord>(&bytes)?);
        }
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(records)
    }

    /// Save a notification (create or update).
    pub fn save(&self, record: &NotificationRecord) -> Result<()> {
        let json = serde_json::to_vec(record)?;
        self.inner.put_raw(&record.id, &record.recipient_id, &json)
    }

    pub fn delete(&self, record: &NotificationRecord) -> Result<bool> {
        self.inner.delete(&record.id, &record.recipient_id)
    }

    pub fn count(&self) -> Result<usize> {
        self.inner.count()
    }
}
