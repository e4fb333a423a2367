//! Review session context.
//!
//! All mutable host state lives in one `ReviewSession` owned by the event
//! loop — no module-level globals. The command handler is the only mutator;
//! everything else reads. Because the loop processes one event at a time,
//! nothing here needs interior mutability or locks.

use marginalia_core::render::DecorationSet;
use marginalia_core::store::PendingDelete;

/// The host's view of the review in progress.
#[derive(Default)]
pub struct ReviewSession {
    /// Workspace-relative path of the document that currently has focus.
    pub active_file: Option<String>,
    /// Decorations materialized for `active_file`. Cleared on every editor
    /// switch before the next render, so stale ranges never linger.
    pub decorations: DecorationSet,
    /// The delete awaiting its confirmation reply, if any. A newer request
    /// replaces it; an unmatched or missing token confirms nothing — the
    /// fail-safe default is "no deletion".
    pub pending_delete: Option<PendingDelete>,
    /// Set when rubrics were sent and not yet acknowledged. Rubrics are only
    /// ever re-sent on an explicit request, never on a timer.
    pub rubrics_pending: bool,
}

impl ReviewSession {
    /// Moves focus to `file_name` (or to no editor) and drops the previous
    /// document's decorations.
    pub fn switch_file(&mut self, file_name: Option<String>) {
        self.active_file = file_name;
        self.decorations.clear();
    }

    /// Whether `file_name` still describes the active document. A slow
    /// worker reply for a previously focused file fails this check and is
    /// dropped.
    pub fn is_active(&self, file_name: &str) -> bool {
        self.active_file.as_deref() == Some(file_name)
    }
}
