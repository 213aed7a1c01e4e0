//! Domain models shared across the core and server crates.

pub mod folder;
pub mod media;
pub mod notification;
pub mod resource;

pub use folder::Folder;
pub use media::MediaItem;
pub use notification::{NotificationKind, NotificationRecord, ScheduledStatus};
pub use resource::ResourceRef;

// Grants are modeled in the storage crate, where consumption needs the
// conditional write primitive.
pub use keepsake_storage::{Grant, GrantMode, ResourceType};
