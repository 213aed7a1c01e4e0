//! Service layer: every state transition the host can trigger.

pub mod grants;
pub mod library;
pub mod reconcile;
pub mod resource;
pub mod schedule;
pub mod share;
pub mod view;
