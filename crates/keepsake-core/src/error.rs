//! Error taxonomy for the service layer.
//!
//! Two expected conditions are deliberately not errors: a replayed view-once
//! consumption reports `consumed: false`, and a batch share with mixed
//! per-recipient outcomes returns the outcome list rather than failing.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Resource, grant, or notification absent
    #[error("{0} not found")]
    NotFound(String),

    /// Access policy denied the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed input (empty recipient list, inconsistent timestamps, ...)
    #[error("invalid request: {0}")]
    Validation(String),

    /// Unexpected failure in the backing store
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
