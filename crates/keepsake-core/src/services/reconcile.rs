//! Notification reconciliation: read-time validation of delivery tickets.
//!
//! Notifications decouple delivery from access, so they drift: the folder
//! gets deleted, the grant gets revoked, the view-once entry gets consumed.
//! Nothing repairs them at mutation time. Instead, every listing re-checks
//! each candidate against current resource and grant state and deletes the
//! stale ones — a synchronous garbage collector on the read path. Between
//! listings a stale record may exist; that staleness window is accepted.
//!
//! Deletions here are silent repairs, logged but never surfaced as errors.
//! The function is an explicitly named operation so a periodic sweep can
//! invoke the same logic as the listing endpoint.

use crate::error::CoreResult;
use crate::models::{NotificationKind, NotificationRecord, ScheduledStatus};
use crate::policy;
use crate::storage::Storage;
use serde::Deserialize;
use tracing::debug;

/// Listing filter. Defaults hide viewed tickets; an expired record is
/// deleted on sight unless `include_expired` retains it.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct NotificationFilter {
    #[serde(default)]
    pub kind: Option<NotificationKind>,
    #[serde(default)]
    pub include_viewed: bool,
    #[serde(default)]
    pub include_expired: bool,
}

/// List a recipient's notifications, deleting every stale or expired record
/// met along the way. The result is consistent with resource and grant state
/// at the moment of the call.
///
/// Staleness and expiry are checked for every candidate before any filter
/// applies, so a filtered listing garbage-collects as thoroughly as an
/// unfiltered one.
pub fn list_valid(
    storage: &Storage,
    recipient_id: &str,
    filter: &NotificationFilter,
) -> CoreResult<Vec<NotificationRecord>> {
    let now = chrono::Utc::now().timestamp();
    let candidates = storage.notifications.list_for_recipient(recipient_id)?;

    let mut valid = Vec::with_capacity(candidates.len());
    for record in candidates {
        if is_stale(storage, &record)? {
            debug!(
                notification_id = %record.id,
                recipient_id, "deleting stale notification"
            );
            storage.notifications.delete(&record)?;
            continue;
        }

        // TTL expiry. `include_expired` retains the record for inspection;
        // otherwise a lapsed ticket is garbage, same as a stale one.
        if record.scheduled_status(now) == ScheduledStatus::Expired && !filter.include_expired {
            debug!(
                notification_id = %record.id,
                recipient_id, "deleting expired notification"
            );
            storage.notifications.delete(&record)?;
            continue;
        }

        if let Some(kind) = filter.kind {
            if record.kind != kind {
                continue;
            }
        }
        if !filter.include_viewed && record.is_viewed {
            continue;
        }

        valid.push(record);
    }

    Ok(valid)
}

/// A record is stale when the resource it points at is gone or its recipient
/// can no longer reach it.
///
/// Viewed records are exempt from the access re-check: a consumed view-once
/// ticket is history, not a live pointer, and stays until explicitly deleted
/// or filtered out.
fn is_stale(storage: &Storage, record: &NotificationRecord) -> CoreResult<bool> {
    let folder = match &record.folder_id {
        Some(folder_id) => match storage.folders.get(folder_id)? {
            Some(folder) => Some(folder),
            None => return Ok(true),
        },
        None => None,
    };

    let media = match &record.media_id {
        Some(media_id) => match storage.media.get(media_id)? {
            Some(media) => Some(media),
            None => return Ok(true),
        },
        None => None,
    };

    if record.is_viewed {
        return Ok(false);
    }

    // Non-view-once tickets require live folder access.
    if record.kind != NotificationKind::ViewOnce {
        if let Some(folder) = &folder {
            let grants = storage
                .grants
                .get_for_grantee(&folder.id, &record.recipient_id)?;
            if !policy::can_view_folder(folder, &record.recipient_id, &grants) {
                return Ok(true);
            }
        }
    }

    if let Some(media) = &media {
        let grants = storage
            .grants
            .get_for_grantee(&media.id, &record.recipient_id)?;
        if !policy::can_view_media(media, &record.recipient_id, &grants) {
            return Ok(true);
        }
    }

    Ok(false)
}
