//! Keepsake core: ephemeral media sharing over an embedded store.
//!
//! A principal shares a folder or media item with other principals, either
//! persistently or view-once, immediately or on a schedule. Each share
//! writes a normalized grant and a notification ticket; access is always
//! evaluated against the grants, while notifications are lazily reconciled
//! against them at read time.

pub mod error;
pub mod external;
pub mod models;
pub mod policy;
pub mod services;
pub mod storage;

pub use error::{CoreError, CoreResult};

use anyhow::Result;
use external::Collaborators;
use std::sync::Arc;
use storage::Storage;
use tracing::info;

/// Core application state shared by the server and by embedders.
pub struct AppCore {
    pub storage: Arc<Storage>,
    pub collaborators: Collaborators,
}

impl AppCore {
    /// Open the database at `db_path` with no-op collaborators.
    pub fn new(db_path: &str) -> Result<Self> {
        Self::with_collaborators(db_path, Collaborators::noop())
    }

    /// Open the database at `db_path` with the given collaborator bundle.
    pub fn with_collaborators(db_path: &str, collaborators: Collaborators) -> Result<Self> {
        let storage = Arc::new(Storage::new(db_path)?);
        info!(db_path, "keepsake core initialized");
        Ok(Self {
            storage,
            collaborators,
        })
    }
}
