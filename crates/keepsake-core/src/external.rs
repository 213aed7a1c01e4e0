//! Contracts with out-of-core collaborators.
//!
//! Blob storage, outbound notification, principal resolution and realtime
//! fan-out all live outside the core. Only the trait shapes matter here;
//! the bundled implementations are no-ops (plus an in-memory directory)
//! used as defaults and in tests.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Handle returned by a blob store for uploaded bytes
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub id: String,
    pub url: String,
}

/// Opaque blob storage. The core never inspects content; it records the
/// returned id and URL on the media item.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(&self, bytes: Vec<u8>) -> Result<StoredBlob>;
    async fn delete(&self, id: &str) -> Result<bool>;
}

/// Outbound notification channel (email, push). Fire-and-forget: a `false`
/// return or an error must never abort the caller's writes.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, principal_id: &str, template: &str, data: Value) -> bool;
}

/// Resolves human input (email addresses) to principal ids.
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<String>>;
}

/// Best-effort realtime fan-out. No delivery guarantee.
#[async_trait]
pub trait RealtimePublisher: Send + Sync {
    async fn publish(&self, principal_id: &str, event: Value);
}

/// The collaborator bundle handed to the core at startup.
#[derive(Clone)]
pub struct Collaborators {
    pub blobs: Arc<dyn BlobStore>,
    pub notifier: Arc<dyn Notifier>,
    pub directory: Arc<dyn PrincipalDirectory>,
    pub realtime: Arc<dyn RealtimePublisher>,
}

impl Collaborators {
    /// All-no-op bundle: blobs vanish, notifications are logged and dropped,
    /// no email resolves, realtime events go nowhere.
    pub fn noop() -> Self {
        Self {
            blobs: Arc::new(NullBlobStore),
            notifier: Arc::new(NullNotifier),
            directory: Arc::new(InMemoryDirectory::default()),
            realtime: Arc::new(NullPublisher),
        }
    }
}

pub struct NullBlobStore;

#[async_trait]
impl BlobStore for NullBlobStore {
    async fn store(&self, _bytes: Vec<u8>) -> Result<StoredBlob> {
        let id = uuid::Uuid::new_v4().to_string();
        Ok(StoredBlob {
            url: format!("null://{}", id),
            id,
        })
    }

    async fn delete(&self, id: &str) -> Result<bool> {
        debug!(blob_id = id, "null blob store: delete ignored");
        Ok(false)
    }
}

pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, principal_id: &str, template: &str, _data: Value) -> bool {
        debug!(principal_id, template, "null notifier: dropping notification");
        true
    }
}

/// Email -> principal id map, filled at startup or by tests.
#[derive(Default)]
pub struct InMemoryDirectory {
    entries: HashMap<String, String>,
}

impl InMemoryDirectory {
    pub fn with_entries(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }
}

#[async_trait]
impl PrincipalDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<String>> {
        Ok(self.entries.get(email).cloned())
    }
}

pub struct NullPublisher;

#[async_trait]
impl RealtimePublisher for NullPublisher {
    async fn publish(&self, principal_id: &str, _event: Value) {
        debug!(principal_id, "null publisher: dropping event");
    }
}
