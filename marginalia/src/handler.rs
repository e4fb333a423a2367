//! Command handling for the review host.
//!
//! Translates decoded `WebviewCommand`s into store calls, session mutations,
//! and outbound notifications, and returns a [`Flow`] telling the event loop
//! whether to continue or quit. The ordering contract inside one command is
//! fixed: the store write completes, then the refresh fires (via the store's
//! channel), then the re-render that depends on it happens. Nothing is
//! fire-and-forget.
//!
//! Error containment follows the store's taxonomy: a corrupt backing
//! document is logged and treated as an empty collection for rendering,
//! while I/O failures surface to the user as `Error` notifications and are
//! not retried.

use crossbeam_channel::Sender;
use marginalia_core::dispatch::{dispatch_selection, DispatchOutcome};
use marginalia_core::error::StoreError;
use marginalia_core::render::decorations_for;
use marginalia_core::resolve;
use marginalia_core::store::{CommentStore, Mutation, DELETE_PROMPT};
use marginalia_core::types::{InlineComment, Position, Priority, Span};

use crate::document::types::{DocMetrics, DocRequest};
use crate::session::ReviewSession;
use crate::wire::{emit, HostNotification, WebviewCommand, WireSelection};

/// Control-flow signal returned from the command handler.
///
/// The event loop checks this after every command: `Quit` ends the loop;
/// `Continue` waits for the next event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Dispatches one decoded command.
///
/// Mutates `session` in place, performs at most one store mutation, and
/// emits whatever notifications the command calls for.
pub async fn handle_command(
    command: WebviewCommand,
    session: &mut ReviewSession,
    store: &CommentStore,
    doc_tx: &Sender<DocRequest>,
) -> Flow {
    match command {
        WebviewCommand::EditorSwitched { file_name } => {
            session.switch_file(file_name);
            request_render(session, doc_tx);
        }
        WebviewCommand::SelectionChanged { selection } => {
            handle_selection(selection, session, store).await;
        }
        WebviewCommand::SaveComment {
            selection,
            title,
            text,
            priority,
        } => {
            handle_save(selection, &title, &text, priority, session, store).await;
        }
        WebviewCommand::UpdateComment {
            id,
            title,
            text,
            priority,
        } => {
            handle_update(id, &title, &text, priority, store).await;
        }
        WebviewCommand::DeleteComment { id } => {
            let pending = store.request_remove(id);
            emit(&HostNotification::ConfirmRequest {
                token: pending.token().to_string(),
                message: DELETE_PROMPT.to_owned(),
            });
            // A newer delete request supersedes an unanswered one.
            session.pending_delete = Some(pending);
        }
        WebviewCommand::ConfirmDelete { token } => {
            handle_confirm_delete(&token, session, store).await;
        }
        WebviewCommand::CancelDelete { token } => {
            // Fail-safe: dropping the pending value is the whole cancel.
            if matches_pending(session, &token) {
                session.pending_delete = None;
            }
        }
        WebviewCommand::SaveDraft { comments } => match store.replace_general(&comments).await {
            Ok(_) => emit_info("Draft successfully saved."),
            Err(StoreError::Validation(message)) => emit_info(message),
            Err(e) => emit_error(&e),
        },
        WebviewCommand::RequestRubrics => {
            handle_request_rubrics(session, store).await;
        }
        WebviewCommand::AckRubrics => {
            session.rubrics_pending = false;
        }
        WebviewCommand::NavigateToComment {
            file_name,
            line,
            character,
        } => {
            handle_navigate(&file_name, line, character, store).await;
        }
        WebviewCommand::Shutdown => return Flow::Quit,
    }
    Flow::Continue
}

/// Applies a worker metrics reply: recompute and publish decorations for the
/// active document.
///
/// Replies for a file that is no longer active are dropped — the next switch
/// already queued its own request.
pub async fn handle_doc_metrics(
    metrics: DocMetrics,
    session: &mut ReviewSession,
    store: &CommentStore,
) {
    if !session.is_active(&metrics.file_name) {
        return;
    }

    session.decorations.clear();
    if let Some(index) = &metrics.index {
        let comments = snapshot(store).await;
        session.decorations = decorations_for(&comments, &metrics.file_name, index);
    }
    emit(&HostNotification::SetDecorations {
        file_name: metrics.file_name,
        highlights: session.decorations.highlights.clone(),
        markers: session.decorations.markers.clone(),
    });
}

/// Reacts to a completed store write: the tree re-reads, and the active
/// document's decorations are recomputed against fresh metrics.
pub fn handle_store_changed(session: &ReviewSession, doc_tx: &Sender<DocRequest>) {
    emit(&HostNotification::TreeRefresh);
    request_render(session, doc_tx);
}

/// Queues a metrics request for the active file, if there is one.
fn request_render(session: &ReviewSession, doc_tx: &Sender<DocRequest>) {
    if let Some(file_name) = &session.active_file {
        let _ = doc_tx.send(DocRequest::Metrics {
            file_name: file_name.clone(),
        });
    }
}

async fn handle_selection(
    selection: WireSelection,
    session: &ReviewSession,
    store: &CommentStore,
) {
    let outcome = dispatch_selection(
        &session.decorations.highlights,
        (selection.anchor.line, selection.anchor.character),
        (selection.active.line, selection.active.character),
    );
    let DispatchOutcome::Resolved { comment_id } = outcome else {
        return;
    };

    let comments = snapshot(store).await;
    if let Some(comment) = resolve::find_by_id(&comments, comment_id) {
        emit(&HostNotification::OpenCommentEditor {
            comment: comment.clone(),
        });
    }
}

async fn handle_save(
    selection: WireSelection,
    title: &str,
    text: &str,
    priority: Option<Priority>,
    session: &ReviewSession,
    store: &CommentStore,
) {
    let Some(file_name) = &session.active_file else {
        emit_info("No active editor to attach the comment to.");
        return;
    };

    let span = Span::new(
        Position::from_document(selection.anchor.line, selection.anchor.character),
        Position::from_document(selection.active.line, selection.active.character),
    );
    match store.append(file_name, span, title, text, priority).await {
        Ok(_) => emit_info("Comment successfully added."),
        Err(StoreError::Validation(message)) => emit_info(message),
        Err(e) => emit_error(&e),
    }
}

async fn handle_update(
    id: i64,
    title: &str,
    text: &str,
    priority: Option<Priority>,
    store: &CommentStore,
) {
    match store.update(id, title, text, priority).await {
        Ok(Mutation::Applied) => emit_info("Comment successfully updated."),
        Ok(Mutation::Unchanged) => {
            emit_info("Either no changes detected, or missing title or comment.")
        }
        // Unknown id: silent no-op.
        Ok(Mutation::NotFound) => {}
        Err(e) => emit_error(&e),
    }
}

async fn handle_confirm_delete(token: &str, session: &mut ReviewSession, store: &CommentStore) {
    // Only the confirmation matching the outstanding request deletes
    // anything; a stale or unknown token leaves the store untouched.
    let pending = match session.pending_delete.take() {
        Some(p) if p.token().to_string() == token => p,
        other => {
            session.pending_delete = other;
            return;
        }
    };

    match store.confirm_remove(pending).await {
        Ok(Mutation::Applied) => emit_info("Comment successfully deleted."),
        Ok(_) => {}
        Err(e) => emit_error(&e),
    }
}

async fn handle_request_rubrics(session: &mut ReviewSession, store: &CommentStore) {
    if session.rubrics_pending {
        // The consumer never acked the previous payload; an explicit
        // re-request is the recovery path — there is no timed re-post.
        eprintln!("marginalia: rubrics re-requested before ack");
    }
    match store.load_rubrics().await {
        Ok(rubrics) => {
            emit(&HostNotification::Rubrics { rubrics });
            session.rubrics_pending = true;
        }
        Err(e @ StoreError::Parse { .. }) => {
            eprintln!("marginalia: {e}");
            emit(&HostNotification::Rubrics {
                rubrics: Vec::new(),
            });
            session.rubrics_pending = true;
        }
        Err(e) => emit_error(&e),
    }
}

/// Resolves a tree-item activation back to its comment and opens the editor.
///
/// The tree supplies the stored (1-based) start position; resolution runs
/// the same containment rule as a click, over a collapsed range.
async fn handle_navigate(file_name: &str, line: u32, character: u32, store: &CommentStore) {
    let point = (line.saturating_sub(1), character.saturating_sub(1));
    let comments = snapshot(store).await;
    if let Some(comment) = resolve::find_by_span(&comments, file_name, point, point) {
        emit(&HostNotification::OpenCommentEditor {
            comment: comment.clone(),
        });
    }
}

fn matches_pending(session: &ReviewSession, token: &str) -> bool {
    session
        .pending_delete
        .as_ref()
        .is_some_and(|p| p.token().to_string() == token)
}

/// Reads the full comment snapshot for read-only resolution/rendering.
///
/// A corrupt document is contained here: logged once, rendered as empty, and
/// never auto-repaired. Harder failures (I/O) surface to the user.
async fn snapshot(store: &CommentStore) -> Vec<InlineComment> {
    match store.load_inline().await {
        Ok(comments) => comments,
        Err(e @ StoreError::Parse { .. }) => {
            eprintln!("marginalia: {e}");
            Vec::new()
        }
        Err(e) => {
            emit_error(&e);
            Vec::new()
        }
    }
}

fn emit_info(message: &str) {
    emit(&HostNotification::Info {
        message: message.to_owned(),
    });
}

fn emit_error(error: &StoreError) {
    emit(&HostNotification::Error {
        message: error.to_string(),
    });
}
