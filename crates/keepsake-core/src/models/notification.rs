use serde::{Deserialize, Serialize};

/// What kind of share a notification announces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Shared,
    ViewOnce,
    FolderShared,
    Scheduled,
}

/// A delivery ticket created alongside a share grant.
///
/// Notifications carry their own lifecycle, deliberately decoupled from the
/// grant they reference: the grant is the source of truth for access, the
/// notification only tells the recipient about it. The reconciler deletes
/// records whose referenced resource or grant is no longer valid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: String,
    pub recipient_id: String,
    pub sender_id: String,
    pub kind: NotificationKind,
    #[serde(default)]
    pub media_id: Option<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    pub view_once: bool,
    #[serde(default)]
    pub message: Option<String>,
    /// Unix timestamp (seconds); future value means the share is announced
    /// as scheduled
    #[serde(default)]
    pub scheduled_for: Option<i64>,
    /// Unix timestamp (seconds); past value means the ticket has lapsed
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub is_read: bool,
    pub is_viewed: bool,
    #[serde(default)]
    pub viewed_at: Option<i64>,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

impl NotificationRecord {
    pub fn new(
        recipient_id: String,
        sender_id: String,
        kind: NotificationKind,
        media_id: Option<String>,
        folder_id: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            recipient_id,
            sender_id,
            kind,
            media_id,
            folder_id,
            view_once: kind == NotificationKind::ViewOnce,
            message: None,
            scheduled_for: None,
            expires_at: None,
            is_read: false,
            is_viewed: false,
            viewed_at: None,
            created_at: chrono::Utc::now().timestamp(),
        }
    }

    /// Derived scheduling status at time `now`
    pub fn scheduled_status(&self, now: i64) -> ScheduledStatus {
        ScheduledStatus::derive(self.scheduled_for, self.expires_at, now)
    }
}

/// Status of a notification interpreted as a deferred instruction.
///
/// Never stored; always derived from the two timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduledStatus {
    Pending,
    Executed,
    Expired,
}

impl ScheduledStatus {
    /// Expiry is checked first: an operation past its `expires_at` is
    /// `Expired` even when `scheduled_for` is still in the future (bad input
    /// notwithstanding). Then a future `scheduled_for` means `Pending`;
    /// everything else has already run.
    pub fn derive(scheduled_for: Option<i64>, expires_at: Option<i64>, now: i64) -> Self {
        if let Some(expires_at) = expires_at {
            if expires_at < now {
                return ScheduledStatus::Expired;
            }
        }
        if let Some(scheduled_for) = scheduled_for {
            if scheduled_for > now {
                return ScheduledStatus::Pending;
            }
        }
        ScheduledStatus::Executed
    }
}
