//! Storage layer with typed wrappers around keepsake-storage.
//!
//! Folders, media and notifications are stored as JSON bytes and wrapped
//! here with their Rust models. Grant storage is already typed in the
//! storage crate and is re-exported as-is.

pub mod folder;
pub mod media;
pub mod notification;

use anyhow::Result;
use redb::Database;
use std::sync::Arc;

pub use folder::FolderStorage;
pub use keepsake_storage::GrantStorage;
pub use media::MediaStorage;
pub use notification::NotificationStorage;

/// Central storage manager that initializes all storage subsystems.
pub struct Storage {
    db: Arc<Database>,
    pub folders: FolderStorage,
    pub media: MediaStorage,
    pub grants: GrantStorage,
    pub notifications: NotificationStorage,
}

impl Storage {
    /// Create a new storage instance at the given path.
    pub fn new(path: &str) -> Result<Self> {
        let db = Arc::new(Database::create(path)?);
        Self::with_database(db)
    }

    /// Create a storage instance over an already-open database.
    pub fn with_database(db: Arc<Database>) -> Result<Self> {
        let folders = FolderStorage::new(db.clone())?;
        let media = MediaStorage::new(db.clone())?;
        let grants = GrantStorage::new(db.clone())?;
        let notifications = NotificationStorage::new(db.clone())?;

        Ok(Self {
            db,
            folders,
            media,
            grants,
            notifications,
        })
    }

    /// Get a reference to the underlying database
    pub fn get_db(&self) -> Arc<Database> {
        self.db.clone()
    }
}
