//! Access policy evaluator.
//!
//! Pure functions: callers fetch the resource and the principal's grant rows,
//! the policy only inspects them. Nothing here touches storage, so every
//! check can be re-evaluated any number of times without side effects.
//!
//! Rules:
//! - The owner always has full access, regardless of grants.
//! - Edit, delete and share are owner-only. No delegation.
//! - Upload on a folder additionally requires a persistent `Upload` grant.
//! - View is satisfied by any persistent grant, or by a view-once entry that
//!   has not been consumed yet.
//! - For media, `hidden_for` is checked before everything except ownership:
//!   a hidden item stays invisible even behind an unconsumed view-once entry
//!   or a persistent grant.

use crate::models::{Folder, Grant, GrantMode, MediaItem};

pub fn can_edit(owner_id: &str, principal_id: &str) -> bool {
    owner_id == principal_id
}

pub fn can_delete(owner_id: &str, principal_id: &str) -> bool {
    owner_id == principal_id
}

pub fn can_share(owner_id: &str, principal_id: &str) -> bool {
    owner_id == principal_id
}

/// Upload into a folder: owner, or a persistent grant with `Upload` mode.
pub fn can_upload(folder: &Folder, principal_id: &str, grants: &[Grant]) -> bool {
    if folder.owner_id == principal_id {
        return true;
    }
    grants.iter().any(|g| g.mode == GrantMode::Upload)
}

/// View a folder: owner, any persistent grant, or an unconsumed view-once
/// entry.
pub fn can_view_folder(folder: &Folder, principal_id: &str, grants: &[Grant]) -> bool {
    if folder.owner_id == principal_id {
        return true;
    }
    has_persistent(grants) || has_unviewed_view_once(grants)
}

/// View a media item. Same as folders, except `hidden_for` suppresses
/// everything short of ownership.
pub fn can_view_media(media: &MediaItem, principal_id: &str, grants: &[Grant]) -> bool {
    if media.owner_id == principal_id {
        return true;
    }
    if media.is_hidden_for(principal_id) {
        return false;
    }
    has_persistent(grants) || has_unviewed_view_once(grants)
}

fn has_persistent(grants: &[Grant]) -> bool {
    grants
        .iter()
        .any(|g| matches!(g.mode, GrantMode::View | GrantMode::Upload))
}

fn has_unviewed_view_once(grants: &[Grant]) -> bool {
    grants
        .iter()
        .any(|g| g.mode == GrantMode::ViewOnce && !g.viewed)
}
