//! Error types for the notes service.

use thiserror::Error;

use crate::access::Action;

/// Errors surfaced by the service layer.
///
/// Rejections (`NotFound`, `PermissionDenied`, `DuplicateGrant`, `SelfShare`,
/// `Validation`) are decided before any store write. Everything the store
/// itself reports arrives as `Store`.
#[derive(Debug, Error)]
pub enum NotesError {
    /// The named record does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// The caller's access level does not allow the action.
    #[error("You don't have permission to {0}")]
    PermissionDenied(Action),

    /// The dashboard is already shared with this email.
    #[error("Dashboard is already shared with {0}. Edit the existing share instead.")]
    DuplicateGrant(String),

    /// The owner tried to share a dashboard with themselves.
    #[error("You cannot share a dashboard with yourself")]
    SelfShare,

    /// Input failed validation.
    #[error("{0}")]
    Validation(String),

    /// No live session for the presented token.
    #[error("Not logged in")]
    Unauthenticated,

    /// A cascade delete stopped part way; dependents up to `stage` may be gone.
    #[error("Cascade delete stopped while deleting {stage}: {source}")]
    CascadeIncomplete {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },

    /// Store passthrough.
    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = NotesError> = std::result::Result<T, E>;
