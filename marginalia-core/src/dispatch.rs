//! Click dispatcher: point selections → stored comments.
//!
//! One selection-change event moves through three states. *Idle*: the guard
//! rejects anything that is not a true point selection, so drag-selects made
//! while reading never open the editor. *Matching*: the materialized
//! highlight ranges of the active document are scanned for one containing
//! the point. *Resolved*: the containing highlight's comment id is handed
//! back for the host to open the edit UI with. No match falls straight back
//! to idle with no side effect.
//!
//! Selection events are handled one at a time on the host's event loop —
//! there is a single active document focus, so no two resolutions ever run
//! concurrently.

use crate::render::Highlight;

/// Where a selection-change event ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The guard rejected the selection (not a point) — nothing was scanned.
    Ignored,
    /// A point selection outside every highlight range.
    NoMatch,
    /// The point fell inside a highlight; the comment to open.
    Resolved { comment_id: i64 },
}

/// Runs one selection-change event against the materialized highlights.
///
/// `anchor` and `active` are the 0-based document endpoints of the new
/// selection. Only a collapsed, single-line selection (anchor equal to
/// active) passes the guard. Containment is inclusive and the first
/// containing highlight wins, mirroring the resolver's store-order
/// tie-break.
pub fn dispatch_selection(
    highlights: &[Highlight],
    anchor: (u32, u32),
    active: (u32, u32),
) -> DispatchOutcome {
    if anchor != active {
        return DispatchOutcome::Ignored;
    }
    let (line, character) = active;
    match highlights
        .iter()
        .find(|h| h.range.contains_point(line, character))
    {
        Some(hit) => DispatchOutcome::Resolved {
            comment_id: hit.comment_id,
        },
        None => DispatchOutcome::NoMatch,
    }
}
