use serde::{Deserialize, Serialize};

/// A media item stored inside a folder.
///
/// The blob itself lives in an external blob store; only its id and serving
/// URL are recorded here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub owner_id: String,
    pub folder_id: String,
    pub name: String,
    pub blob_id: String,
    pub url: String,
    /// Principals for whom this item is permanently suppressed. Independent
    /// of view-once state and checked before it: a hidden item is invisible
    /// even to a principal holding an unconsumed view-once entry.
    #[serde(default)]
    pub hidden_for: Vec<String>,
    /// Whether view-once sharing is currently enabled for this item
    pub view_once_enabled: bool,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    /// Unix timestamp (seconds)
    pub updated_at: i64,
}

impl MediaItem {
    pub fn new(
        owner_id: String,
        folder_id: String,
        name: String,
        blob_id: String,
        url: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            folder_id,
            name,
            blob_id,
            url,
            hidden_for: Vec::new(),
            view_once_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_hidden_for(&self, principal_id: &str) -> bool {
        self.hidden_for.iter().any(|p| p == principal_id)
    }

    /// Hide this item for a principal. Idempotent.
    pub fn hide_for(&mut self, principal_id: &str) {
        if !self.is_hidden_for(principal_id) {
            self.hidden_for.push(principal_id.to_string());
            self.updated_at = chrono::Utc::now().timestamp();
        }
    }
}
