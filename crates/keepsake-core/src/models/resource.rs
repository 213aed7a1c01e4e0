use serde::{Deserialize, Serialize};

/// Reference to a shareable resource, as it arrives in requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResourceRef {
    Folder { id: String },
    Media { id: String },
}

impl ResourceRef {
    pub fn id(&self) -> &str {
        match self {
            ResourceRef::Folder { id } => id,
            ResourceRef::Media { id } => id,
        }
    }
}
