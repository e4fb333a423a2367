//! Normalized error types for store operations.
//!
//! Anything that originates from a single comment's anchor (a stale line
//! number after external edits) is *not* an error value — the renderer skips
//! that comment and keeps the rest. Errors here concern the backing store
//! resource itself and are reported once per operation, not per comment.

use std::path::PathBuf;

use thiserror::Error;

/// Failure modes of the review store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The workspace root the store directory should live under does not
    /// exist. Aborts the whole operation; nothing is created.
    #[error("workspace root {} does not exist", .path.display())]
    WorkspaceMissing { path: PathBuf },

    /// A backing document exists but is not valid JSON for its shape.
    /// A corrupt file is never auto-repaired — callers log and treat the
    /// collection as empty until the user intervenes.
    #[error("malformed review document {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// User input rejected before any write. The payload is the exact
    /// user-visible message; callers surface it as information, not failure.
    #[error("{0}")]
    Validation(&'static str),

    /// Underlying file I/O failed (permissions, disk). Not retried — a retry
    /// is a user-initiated re-action.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
