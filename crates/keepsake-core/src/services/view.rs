//! View consumption and the notification read/viewed transitions.

use crate::error::{CoreError, CoreResult};
use crate::models::{MediaItem, NotificationRecord, ResourceRef};
use crate::policy;
use crate::services::resource;
use crate::storage::Storage;
use serde::Serialize;
use tracing::debug;

/// Result of a view-once consumption attempt.
///
/// `consumed: false` covers both "no entry exists" and "already viewed" —
/// replay is an expected client pattern, not an error.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConsumeOutcome {
    pub consumed: bool,
}

/// Consume the grantee's view-once entry on a resource, if one is live.
///
/// The check-and-set runs inside a single storage write transaction, so of
/// two concurrent callers only one observes `consumed: true`.
pub fn consume(
    storage: &Storage,
    resource: &ResourceRef,
    grantee_id: &str,
) -> CoreResult<ConsumeOutcome> {
    let loaded = resource::load(storage, resource)?;
    let now = chrono::Utc::now().timestamp();
    let consumed = storage.grants.consume(loaded.id(), grantee_id, now)?;
    if consumed {
        debug!(
            resource_id = loaded.id(),
            grantee_id, "view-once entry consumed"
        );
    }
    Ok(ConsumeOutcome { consumed })
}

/// What a successful media view returns to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct MediaView {
    pub media: MediaItem,
    pub consumed: bool,
}

/// View a media item as a principal: policy gate first, then consumption of
/// a view-once entry if that is what admitted the viewer. The item stays
/// viewable for the rest of this response; the next policy check denies.
pub fn view_media(storage: &Storage, media_id: &str, principal_id: &str) -> CoreResult<MediaView> {
    let media = storage
        .media
        .get(media_id)?
        .ok_or_else(|| CoreError::NotFound(format!("media {}", media_id)))?;

    let grants = storage.grants.get_for_grantee(media_id, principal_id)?;
    if !policy::can_view_media(&media, principal_id, &grants) {
        return Err(CoreError::Forbidden(format!(
            "{} may not view media {}",
            principal_id, media_id
        )));
    }

    let now = chrono::Utc::now().timestamp();
    let consumed = storage.grants.consume(media_id, principal_id, now)?;
    if !consumed {
        // A concurrent viewer may have consumed the entry between the gate
        // and the consume attempt. Re-evaluate with current grant state so a
        // race loser does not walk away with the item.
        let grants = storage.grants.get_for_grantee(media_id, principal_id)?;
        if !policy::can_view_media(&media, principal_id, &grants) {
            return Err(CoreError::Forbidden(format!(
                "{} may not view media {}",
                principal_id, media_id
            )));
        }
    }
    Ok(MediaView { media, consumed })
}

/// Mark a notification as read by its recipient.
pub fn mark_read(
    storage: &Storage,
    notification_id: &str,
    recipient_id: &str,
) -> CoreResult<NotificationRecord> {
    let mut record = get_for_recipient(storage, notification_id, recipient_id)?;
    if !record.is_read {
        record.is_read = true;
        storage.notifications.save(&record)?;
    }
    Ok(record)
}

/// Outcome of the viewed transition.
#[derive(Debug, Clone, Serialize)]
pub struct ViewedOutcome {
    pub notification: NotificationRecord,
    pub consumed: bool,
}

/// Mark a notification as viewed by its recipient.
///
/// For a view-once notification referencing a media item this also consumes
/// the grant and hides the item for the recipient, making it permanently
/// inaccessible to them. There is no re-arm.
pub fn mark_viewed(
    storage: &Storage,
    notification_id: &str,
    recipient_id: &str,
) -> CoreResult<ViewedOutcome> {
    let mut record = get_for_recipient(storage, notification_id, recipient_id)?;

    let now = chrono::Utc::now().timestamp();
    if !record.is_viewed {
        record.is_read = true;
        record.is_viewed = true;
        record.viewed_at = Some(now);
        storage.notifications.save(&record)?;
    }

    let mut consumed = false;
    if let Some(media_id) = record.media_id.clone() {
        consumed = storage.grants.consume(&media_id, recipient_id, now)?;

        if record.view_once {
            if let Some(mut media) = storage.media.get(&media_id)? {
                media.hide_for(recipient_id);
                storage.media.save(&media)?;
            }
        }
    }

    Ok(ViewedOutcome {
        notification: record,
        consumed,
    })
}

/// Delete a notification explicitly. Only its recipient may do so.
pub fn delete_notification(
    storage: &Storage,
    notification_id: &str,
    recipient_id: &str,
) -> CoreResult<()> {
    let record = get_for_recipient(storage, notification_id, recipient_id)?;
    storage.notifications.delete(&record)?;
    Ok(())
}

fn get_for_recipient(
    storage: &Storage,
    notification_id: &str,
    recipient_id: &str,
) -> CoreResult<NotificationRecord> {
    let record = storage
        .notifications
        .get(notification_id)?
        .ok_or_else(|| CoreError::NotFound(format!("notification {}", notification_id)))?;
    if record.recipient_id != recipient_id {
        return Err(CoreError::Forbidden(format!(
            "notification {} does not belong to {}",
            notification_id, recipient_id
        )));
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Folder, GrantMode, MediaItem, NotificationKind};
    use crate::services::grants;
    use tempfile::tempdir;

    fn test_storage() -> (tempfile::TempDir, Storage) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let storage = Storage::new(path.to_str().unwrap()).unwrap();
        (dir, storage)
    }

    fn seed_media(storage: &Storage, owner: &str) -> MediaItem {
        let folder = Folder::new(owner.to_string(), "trip".to_string());
        storage.folders.create(&folder).unwrap();
        let media = MediaItem::new(
            owner.to_string(),
            folder.id.clone(),
            "beach.jpg".to_string(),
            "blob-1".to_string(),
            "https://blobs.example/blob-1".to_string(),
        );
        storage.media.create(&media).unwrap();
        media
    }

    #[test]
    fn test_view_once_is_consumed_exactly_once() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let mref = ResourceRef::Media { id: media.id.clone() };

        grants::add_view_once_entry(&storage, &mref, "bob").unwrap();

        let first = view_media(&storage, &media.id, "bob").unwrap();
        assert!(first.consumed);

        // Replayed consume is a no-op, and the policy now denies
        assert!(!consume(&storage, &mref, "bob").unwrap().consumed);
        let err = view_media(&storage, &media.id, "bob").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_racing_viewers_only_one_receives_the_media() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let mref = ResourceRef::Media { id: media.id.clone() };
        grants::add_view_once_entry(&storage, &mref, "bob").unwrap();

        let storage = std::sync::Arc::new(storage);
        let mut handles = Vec::new();
        for _ in 0..8 {
            let storage = storage.clone();
            let media_id = media.id.clone();
            handles.push(std::thread::spawn(move || {
                view_media(&storage, &media_id, "bob")
            }));
        }

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results
            .iter()
            .filter(|r| matches!(r, Ok(view) if view.consumed))
            .count();
        assert_eq!(wins, 1);
        // losers get Forbidden, never the media
        for result in results {
            if let Ok(view) = result {
                assert!(view.consumed);
            }
        }
    }

    #[test]
    fn test_view_without_grant_is_forbidden() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let err = view_media(&storage, &media.id, "bob").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_persistent_view_does_not_consume_anything() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let mref = ResourceRef::Media { id: media.id.clone() };

        grants::add_persistent_grant(&storage, &mref, "bob", GrantMode::View).unwrap();

        for _ in 0..3 {
            let view = view_media(&storage, &media.id, "bob").unwrap();
            assert!(!view.consumed);
        }
    }

    #[test]
    fn test_mark_viewed_consumes_and_hides() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let mref = ResourceRef::Media { id: media.id.clone() };
        grants::add_view_once_entry(&storage, &mref, "bob").unwrap();

        let record = NotificationRecord::new(
            "bob".to_string(),
            "alice".to_string(),
            NotificationKind::ViewOnce,
            Some(media.id.clone()),
            Some(media.folder_id.clone()),
        );
        storage.notifications.save(&record).unwrap();

        let outcome = mark_viewed(&storage, &record.id, "bob").unwrap();
        assert!(outcome.consumed);
        assert!(outcome.notification.is_viewed);
        assert!(outcome.notification.is_read);

        let reloaded = storage.media.get(&media.id).unwrap().unwrap();
        assert!(reloaded.is_hidden_for("bob"));

        // Second call is idempotent and reports no new consumption
        let again = mark_viewed(&storage, &record.id, "bob").unwrap();
        assert!(!again.consumed);
    }

    #[test]
    fn test_mark_viewed_wrong_recipient_is_forbidden() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let record = NotificationRecord::new(
            "bob".to_string(),
            "alice".to_string(),
            NotificationKind::Shared,
            Some(media.id.clone()),
            Some(media.folder_id.clone()),
        );
        storage.notifications.save(&record).unwrap();

        let err = mark_viewed(&storage, &record.id, "mallory").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[test]
    fn test_delete_notification_is_recipient_only() {
        let (_dir, storage) = test_storage();
        let media = seed_media(&storage, "alice");
        let record = NotificationRecord::new(
            "bob".to_string(),
            "alice".to_string(),
            NotificationKind::Shared,
            Some(media.id.clone()),
            Some(media.folder_id.clone()),
        );
        storage.notifications.save(&record).unwrap();

        let err = delete_notification(&storage, &record.id, "mallory").unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
        assert!(storage.notifications.get(&record.id).unwrap().is_some());

        delete_notification(&storage, &record.id, "bob").unwrap();
        assert!(storage.notifications.get(&record.id).unwrap().is_none());

        let err = delete_notification(&storage, &record.id, "bob").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }
}
