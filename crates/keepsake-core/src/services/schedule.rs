//! Scheduled-operation handling.
//!
//! A scheduled operation is nothing but a notification read through a
//! different lens: its status is derived from `scheduled_for` / `expires_at`
//! on every read (see [`ScheduledStatus::derive`]), never stored.

use crate::error::{CoreError, CoreResult};
use crate::models::{NotificationRecord, ScheduledStatus};
use crate::storage::Storage;
use serde::Serialize;

/// A notification with its derived status attached.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledOperation {
    #[serde(flatten)]
    pub notification: NotificationRecord,
    pub status: ScheduledStatus,
}

/// List a recipient's notifications that carry scheduling timestamps, each
/// with its status as of now.
pub fn list_for_recipient(
    storage: &Storage,
    recipient_id: &str,
) -> CoreResult<Vec<ScheduledOperation>> {
    let now = chrono::Utc::now().timestamp();
    let records = storage.notifications.list_for_recipient(recipient_id)?;

    Ok(records
        .into_iter()
        .filter(|r| r.scheduled_for.is_some() || r.expires_at.is_some())
        .map(|notification| ScheduledOperation {
            status: notification.scheduled_status(now),
            notification,
        })
        .collect())
}

/// Execute a pending operation immediately by moving `scheduled_for` to now.
///
/// Idempotent: an already-executed or expired operation is returned
/// unchanged, and calling twice yields the same observable status.
pub fn execute_now(storage: &Storage, notification_id: &str) -> CoreResult<ScheduledOperation> {
    let mut record = storage
        .notifications
        .get(notification_id)?
        .ok_or_else(|| CoreError::NotFound(format!("notification {}", notification_id)))?;

    let now = chrono::Utc::now().timestamp();
    if record.scheduled_status(now) == ScheduledStatus::Pending {
        record.scheduled_for = Some(now);
        storage.notifications.save(&record)?;
    }

    Ok(ScheduledOperation {
        status: record.scheduled_status(now),
        notification: record,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NotificationKind, NotificationRecord};
    use tempfile::tempdir;

    fn test_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let storage = Storage::new(path.to_str().unwrap()).unwrap();
        (dir, storage)
    }

    fn scheduled_record(recipient: &str, scheduled_for: i64) -> NotificationRecord {
        let mut record = NotificationRecord::new(
            recipient.to_string(),
            "alice".to_string(),
            NotificationKind::Scheduled,
            None,
            Some("folder-1".to_string()),
        );
        record.scheduled_for = Some(scheduled_for);
        record
    }

    #[test]
    fn test_execute_now_flips_pending_to_executed() {
        let (_dir, storage) = test_storage();
        let now = chrono::Utc::now().timestamp();
        let record = scheduled_record("bob", now + 3600);
        storage.notifications.save(&record).unwrap();

        let executed = execute_now(&storage, &record.id).unwrap();
        assert_eq!(executed.status, ScheduledStatus::Executed);

        // idempotent
        let again = execute_now(&storage, &record.id).unwrap();
        assert_eq!(again.status, ScheduledStatus::Executed);
    }

    #[test]
    fn test_execute_now_leaves_expired_expired() {
        let (_dir, storage) = test_storage();
        let now = chrono::Utc::now().timestamp();
        let mut record = scheduled_record("bob", now + 3600);
        record.expires_at = Some(now - 60);
        storage.notifications.save(&record).unwrap();

        let outcome = execute_now(&storage, &record.id).unwrap();
        assert_eq!(outcome.status, ScheduledStatus::Expired);
        // scheduled_for untouched
        assert_eq!(
            storage
                .notifications
                .get(&record.id)
                .unwrap()
                .unwrap()
                .scheduled_for,
            Some(now + 3600)
        );
    }

    #[test]
    fn test_unknown_operation_is_not_found() {
        let (_dir, storage) = test_storage();
        let err = execute_now(&storage, "nope").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn test_list_only_returns_scheduled_records() {
        let (_dir, storage) = test_storage();
        let now = chrono::Utc::now().timestamp();

        storage
            .notifications
            .save(&scheduled_record("bob", now + 3600))
            .unwrap();
        let plain = NotificationRecord::new(
            "bob".to_string(),
            "alice".to_string(),
            NotificationKind::Shared,
            Some("media-1".to_string()),
            Some("folder-1".to_string()),
        );
        storage.notifications.save(&plain).unwrap();

        let ops = list_for_recipient(&storage, "bob").unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].status, ScheduledStatus::Pending);
    }
}
