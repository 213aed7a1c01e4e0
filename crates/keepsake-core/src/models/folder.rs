use serde::{Deserialize, Serialize};

/// A folder owned by one principal.
///
/// Access grants are not embedded here; they live as normalized rows in
/// grant storage. The folder only carries the view-once toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    /// Whether view-once sharing is currently enabled for this folder
    pub view_once_enabled: bool,
    /// Unix timestamp (seconds)
    pub created_at: i64,
    /// Unix timestamp (seconds)
    pub updated_at: i64,
}

impl Folder {
    pub fn new(owner_id: String, name: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            owner_id,
            name,
            view_once_enabled: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().timestamp();
    }
}
