//! Share coordination: the single entry point for producing new shares.
//!
//! Every share variant (by principal id, by email, immediate or scheduled,
//! persistent or view-once) funnels through [`create_share`]. Per recipient
//! the pipeline is: resolve principal, write the grant, write the
//! notification, then fire-and-forget delivery. Recipients fail
//! independently; one bad address never aborts the rest of the batch.

use crate::error::{CoreError, CoreResult};
use crate::external::Collaborators;
use crate::models::{GrantMode, NotificationKind, NotificationRecord, ResourceRef};
use crate::policy;
use crate::services::{grants, resource};
use crate::storage::Storage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// How the share request names a recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", content = "value", rename_all = "lowercase")]
pub enum RecipientRef {
    /// Already-resolved principal id
    Principal(String),
    /// Human input, resolved through the principal directory
    Email(String),
}

impl RecipientRef {
    fn display(&self) -> &str {
        match self {
            RecipientRef::Principal(id) => id,
            RecipientRef::Email(email) => email,
        }
    }
}

/// Grant mode requested for the share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareMode {
    View,
    Upload,
    ViewOnce,
}

/// Optional deferred-execution window.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ShareSchedule {
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub scheduled_for: Option<i64>,
    /// Unix timestamp (seconds)
    #[serde(default)]
    pub expires_at: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareRequest {
    pub resource: ResourceRef,
    pub sender_id: String,
    pub recipients: Vec<RecipientRef>,
    pub mode: ShareMode,
    #[serde(default)]
    pub schedule: Option<ShareSchedule>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Per-recipient result. The batch as a whole succeeds even when individual
/// entries carry an error.
#[derive(Debug, Clone, Serialize)]
pub struct RecipientOutcome {
    pub recipient: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notification_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecipientOutcome {
    fn ok(recipient: &RecipientRef, notification_id: String) -> Self {
        Self {
            recipient: recipient.display().to_string(),
            success: true,
            notification_id: Some(notification_id),
            error: None,
        }
    }

    fn failed(recipient: &RecipientRef, error: String) -> Self {
        Self {
            recipient: recipient.display().to_string(),
            success: false,
            notification_id: None,
            error: Some(error),
        }
    }
}

/// Create a share: write grants and notifications for every recipient.
///
/// The grant is written immediately even when `scheduled_for` lies in the
/// future; only the notification carries the timestamp, and its displayed
/// status stays `pending` until the moment passes.
pub async fn create_share(
    storage: &Storage,
    collaborators: &Collaborators,
    request: ShareRequest,
) -> CoreResult<Vec<RecipientOutcome>> {
    let loaded = resource::load(storage, &request.resource)?;

    if !policy::can_share(loaded.owner_id(), &request.sender_id) {
        return Err(CoreError::Forbidden(format!(
            "{} may not share {}",
            request.sender_id,
            loaded.id()
        )));
    }

    if request.recipients.is_empty() {
        return Err(CoreError::Validation("recipient list is empty".to_string()));
    }
    if request.mode == ShareMode::Upload && matches!(request.resource, ResourceRef::Media { .. }) {
        return Err(CoreError::Validation(
            "upload grants only apply to folders".to_string(),
        ));
    }
    if let Some(schedule) = &request.schedule {
        if let (Some(scheduled_for), Some(expires_at)) = (schedule.scheduled_for, schedule.expires_at)
        {
            if expires_at <= scheduled_for {
                return Err(CoreError::Validation(
                    "expires_at must be after scheduled_for".to_string(),
                ));
            }
        }
    }

    let mut outcomes = Vec::with_capacity(request.recipients.len());
    for recipient in &request.recipients {
        let outcome = match share_with_one(storage, collaborators, &request, &loaded, recipient).await
        {
            Ok(notification_id) => RecipientOutcome::ok(recipient, notification_id),
            Err(err) => {
                warn!(
                    recipient = recipient.display(),
                    error = %err,
                    "share failed for recipient"
                );
                RecipientOutcome::failed(recipient, err.to_string())
            }
        };
        outcomes.push(outcome);
    }

    Ok(outcomes)
}

async fn share_with_one(
    storage: &Storage,
    collaborators: &Collaborators,
    request: &ShareRequest,
    loaded: &resource::LoadedResource,
    recipient: &RecipientRef,
) -> CoreResult<String> {
    let principal_id = resolve(collaborators, recipient).await?;

    match request.mode {
        ShareMode::View => {
            grants::add_persistent_grant(storage, &request.resource, &principal_id, GrantMode::View)?
        }
        ShareMode::Upload => grants::add_persistent_grant(
            storage,
            &request.resource,
            &principal_id,
            GrantMode::Upload,
        )?,
        ShareMode::ViewOnce => {
            grants::add_view_once_entry(storage, &request.resource, &principal_id)?
        }
    }

    let record = build_notification(request, loaded, &principal_id);
    storage.notifications.save(&record)?;
    debug!(
        notification_id = %record.id,
        recipient = %principal_id,
        "share recorded"
    );

    // Delivery is best-effort; neither channel may fail the write above.
    let payload = serde_json::json!({
        "notification_id": record.id,
        "sender_id": request.sender_id,
        "media_id": record.media_id,
        "folder_id": record.folder_id,
        "view_once": record.view_once,
        "scheduled_for": record.scheduled_for,
    });
    let template = match record.kind {
        NotificationKind::ViewOnce => "share_view_once",
        NotificationKind::FolderShared => "share_folder",
        NotificationKind::Scheduled => "share_scheduled",
        NotificationKind::Shared => "share_media",
    };
    if !collaborators
        .notifier
        .notify(&principal_id, template, payload.clone())
        .await
    {
        warn!(recipient = %principal_id, "notifier reported failure, ignoring");
    }
    collaborators.realtime.publish(&principal_id, payload).await;

    Ok(record.id)
}

async fn resolve(collaborators: &Collaborators, recipient: &RecipientRef) -> CoreResult<String> {
    match recipient {
        RecipientRef::Principal(id) if !id.is_empty() => Ok(id.clone()),
        RecipientRef::Principal(_) => {
            Err(CoreError::Validation("empty principal id".to_string()))
        }
        RecipientRef::Email(email) => collaborators
            .directory
            .find_by_email(email)
            .await?
            .ok_or_else(|| CoreError::NotFound(format!("no principal for {}", email))),
    }
}

fn build_notification(
    request: &ShareRequest,
    loaded: &resource::LoadedResource,
    principal_id: &str,
) -> NotificationRecord {
    // Media notifications carry both references so the reconciler can check
    // the containing folder too.
    let (media_id, folder_id) = match loaded {
        resource::LoadedResource::Folder(folder) => (None, Some(folder.id.clone())),
        resource::LoadedResource::Media(media) => {
            (Some(media.id.clone()), Some(media.folder_id.clone()))
        }
    };

    let schedule = request.schedule.unwrap_or_default();
    let kind = if request.mode == ShareMode::ViewOnce {
        NotificationKind::ViewOnce
    } else if schedule.scheduled_for.is_some() {
        NotificationKind::Scheduled
    } else if matches!(request.resource, ResourceRef::Folder { .. }) {
        NotificationKind::FolderShared
    } else {
        NotificationKind::Shared
    };

    let mut record = NotificationRecord::new(
        principal_id.to_string(),
        request.sender_id.clone(),
        kind,
        media_id,
        folder_id,
    );
    record.view_once = request.mode == ShareMode::ViewOnce;
    record.message = request.message.clone();
    record.scheduled_for = schedule.scheduled_for;
    record.expires_at = schedule.expires_at;
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::InMemoryDirectory;
    use crate::models::{Folder, MediaItem};
    use std::sync::Arc;
    use tempfile::tempdir;

    fn test_env() -> (tempfile::TempDir, Storage, Collaborators) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");
        let storage = Storage::new(path.to_str().unwrap()).unwrap();
        let mut collaborators = Collaborators::noop();
        collaborators.directory = Arc::new(InMemoryDirectory::with_entries([(
            "bob@example.com".to_string(),
            "bob".to_string(),
        )]));
        (dir, storage, collaborators)
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

    fn share_request(media: &MediaItem, recipients: Vec<RecipientRef>) -> ShareRequest {
        ShareRequest {
            resource: ResourceRef::Media { id: media.id.clone() },
            sender_id: media.owner_id.clone(),
            recipients,
            mode: ShareMode::View,
            schedule: None,
            message: None,
        }
    }

    #[tokio::test]
    async fn test_batch_partial_failure() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");

        let request = share_request(
            &media,
            vec![
                RecipientRef::Email("bob@example.com".to_string()),
                RecipientRef::Email("stranger@example.com".to_string()),
            ],
        );
        let outcomes = create_share(&storage, &collaborators, request).await.unwrap();

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].success);
        assert!(outcomes[0].notification_id.is_some());
        assert!(!outcomes[1].success);
        assert!(outcomes[1].error.as_ref().unwrap().contains("stranger"));

        // the valid recipient's grant and notification exist regardless
        assert_eq!(storage.grants.get_for_grantee(&media.id, "bob").unwrap().len(), 1);
        assert_eq!(storage.notifications.list_for_recipient("bob").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_only_owner_may_share() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");

        let mut request = share_request(&media, vec![RecipientRef::Principal("bob".to_string())]);
        request.sender_id = "mallory".to_string();

        let err = create_share(&storage, &collaborators, request).await.unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_empty_recipient_list_is_rejected() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");

        let request = share_request(&media, Vec::new());
        let err = create_share(&storage, &collaborators, request).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upload_mode_rejected_for_media() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");

        let mut request = share_request(&media, vec![RecipientRef::Principal("bob".to_string())]);
        request.mode = ShareMode::Upload;

        let err = create_share(&storage, &collaborators, request).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_scheduled_share_writes_grant_immediately() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");
        let now = chrono::Utc::now().timestamp();

        let mut request = share_request(&media, vec![RecipientRef::Principal("bob".to_string())]);
        request.schedule = Some(ShareSchedule {
            scheduled_for: Some(now + 3600),
            expires_at: Some(now + 7200),
        });

        let outcomes = create_share(&storage, &collaborators, request).await.unwrap();
        assert!(outcomes[0].success);

        // grant exists now; the notification alone carries the future time
        assert_eq!(storage.grants.get_for_grantee(&media.id, "bob").unwrap().len(), 1);
        let record = storage
            .notifications
            .get(outcomes[0].notification_id.as_ref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, NotificationKind::Scheduled);
        assert_eq!(
            record.scheduled_status(now),
            crate::models::ScheduledStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_inverted_schedule_is_rejected() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");
        let now = chrono::Utc::now().timestamp();

        let mut request = share_request(&media, vec![RecipientRef::Principal("bob".to_string())]);
        request.schedule = Some(ShareSchedule {
            scheduled_for: Some(now + 7200),
            expires_at: Some(now + 3600),
        });

        let err = create_share(&storage, &collaborators, request).await.unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_view_once_share_sets_kind_and_flag() {
        let (_dir, storage, collaborators) = test_env();
        let media = seed_media(&storage, "alice");

        let mut request = share_request(&media, vec![RecipientRef::Principal("bob".to_string())]);
        request.mode = ShareMode::ViewOnce;

        let outcomes = create_share(&storage, &collaborators, request).await.unwrap();
        let record = storage
            .notifications
            .get(outcomes[0].notification_id.as_ref().unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(record.kind, NotificationKind::ViewOnce);
        assert!(record.view_once);
        assert_eq!(record.media_id.as_deref(), Some(media.id.as_str()));
        assert_eq!(record.folder_id.as_deref(), Some(media.folder_id.as_str()));
    }
}
