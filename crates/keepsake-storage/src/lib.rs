//! Keepsake Storage - Low-level storage abstraction layer
//!
//! This crate provides the persistence layer for Keepsake, using redb as the
//! embedded database. It exposes byte-level APIs for the document-shaped
//! entities (folders, media, notifications); higher-level typed wrappers are
//! provided by the keepsake-core crate. Grants are the exception: they are
//! stored typed here because view-once consumption needs a conditional
//! check-and-set inside a single write transaction.
//!
//! # Tables
//!
//! - `folders` / `folder_owner_index` - Folder documents and their owner index
//! - `media` / `media_folder_index` - Media items and their folder index
//! - `grants` - Normalized access grants, keyed `resource:grantee:slot`
//! - `notifications` / `notification_recipient_index` - Notification records

pub mod folder;
pub mod grant;
pub mod media;
pub mod notification;

pub use folder::FolderStorage;
pub use grant::{Grant, GrantMode, GrantStorage, ResourceType};
pub use media::MediaStorage;
pub use notification::NotificationStorage;
