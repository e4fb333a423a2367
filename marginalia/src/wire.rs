//! Stdio wire protocol for the review host.
//!
//! Commands arrive one JSON object per line on stdin; notifications leave one
//! JSON object per line on stdout. Both directions are tagged unions decoded
//! or encoded exactly once here, so the core never sees an untyped payload
//! and the editor glue never sees a Rust type. An unknown or malformed line
//! is logged to stderr and dropped — it can never take the loop down.

use std::io::Write;

use marginalia_core::render::{DocRange, Highlight};
use marginalia_core::types::{GeneralDraft, InlineComment, Priority, Rubric};
use serde::{Deserialize, Serialize};

/// A 0-based document position as the editor reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WirePosition {
    pub line: u32,
    pub character: u32,
}

/// A raw selection: `anchor` is where the drag started, `active` where it
/// ended. Equal endpoints mean a caret (point) selection.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WireSelection {
    pub anchor: WirePosition,
    pub active: WirePosition,
}

/// Everything the editor glue can ask the host to do.
///
/// `NavigateToComment` carries the stored (1-based) start position exactly as
/// the comment tree holds it; every other position on the wire is 0-based.
#[derive(Debug, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum WebviewCommand {
    /// Focus moved to another editor; `None` when no editor has focus.
    EditorSwitched { file_name: Option<String> },
    /// The selection in the active editor changed.
    SelectionChanged { selection: WireSelection },
    /// Persist a new anchored comment for the active file.
    SaveComment {
        selection: WireSelection,
        title: String,
        text: String,
        priority: Option<Priority>,
    },
    /// Rewrite title/body/priority of an existing comment.
    UpdateComment {
        id: i64,
        title: String,
        text: String,
        priority: Option<Priority>,
    },
    /// Ask to delete a comment. The host replies with a `ConfirmRequest`;
    /// nothing is removed until the matching `ConfirmDelete` arrives.
    DeleteComment { id: i64 },
    ConfirmDelete { token: String },
    CancelDelete { token: String },
    /// Replace the general-comments draft.
    SaveDraft { comments: Vec<GeneralDraft> },
    /// Ask for the rubric criteria (sent again only on explicit request).
    RequestRubrics,
    /// The rubrics payload arrived — stop considering it pending.
    AckRubrics,
    /// A comment tree item was activated; stored 1-based start position.
    NavigateToComment {
        file_name: String,
        line: u32,
        character: u32,
    },
    Shutdown,
}

/// Everything the host can tell the editor glue.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum HostNotification {
    /// Replace both decoration layers for `file_name` wholesale.
    SetDecorations {
        file_name: String,
        highlights: Vec<Highlight>,
        markers: Vec<DocRange>,
    },
    /// The store changed; the comment tree should re-read it.
    TreeRefresh,
    /// Open the edit UI pre-filled with this comment.
    OpenCommentEditor { comment: InlineComment },
    /// Show a confirmation prompt; reply with `ConfirmDelete`/`CancelDelete`
    /// carrying the same token.
    ConfirmRequest { token: String, message: String },
    /// The rubric criteria; answer with `AckRubrics` on receipt.
    Rubrics { rubrics: Vec<Rubric> },
    /// User-visible information (saves, rejections, no-ops).
    Info { message: String },
    /// User-visible failure (I/O, missing workspace).
    Error { message: String },
}

/// Writes one notification line to stdout and flushes it.
///
/// stdout is the protocol channel, so the write is line-buffered explicitly —
/// a notification that sits in a buffer is a notification the editor never
/// saw. Encoding failures are logged to stderr and swallowed; losing one
/// notification is better than killing the host.
pub fn emit(notification: &HostNotification) {
    match serde_json::to_string(notification) {
        Ok(line) => {
            let mut out = std::io::stdout().lock();
            let _ = writeln!(out, "{line}");
            let _ = out.flush();
        }
        Err(e) => eprintln!("marginalia: failed to encode notification: {e}"),
    }
}
