//! Decoration computation for the active document.
//!
//! For every comment anchored to the active file two parallel ranges are
//! derived: the exact stored span as a background *highlight*, and the full
//! extent of the span's last line as a *marker* for the affordance icon. The
//! computation is a pure function of the comment snapshot and the document
//! view, so re-running it on every editor switch is idempotent and the
//! clear-before-re-render pattern cannot drift.

use serde::Serialize;

use crate::types::InlineComment;

/// The narrow document contract the renderer needs from its host: how many
/// lines the document has right now and how long each is. Implementations
/// answer for the document as it currently is on disk or in the editor.
pub trait DocumentView {
    /// Number of lines in the document.
    fn line_count(&self) -> u32;

    /// Character length of the 0-based `line`; 0 for lines outside the
    /// document.
    fn line_len(&self, line: u32) -> u32;
}

/// A 0-based document range, ready for the editor to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocRange {
    pub start_line: u32,
    pub start_character: u32,
    pub end_line: u32,
    pub end_character: u32,
}

impl DocRange {
    /// Inclusive containment of a 0-based document point, lexicographic on
    /// (line, character).
    pub fn contains_point(&self, line: u32, character: u32) -> bool {
        (self.start_line, self.start_character) <= (line, character)
            && (line, character) <= (self.end_line, self.end_character)
    }
}

/// One highlight range, carrying the id of the comment it was derived from
/// so a later click can be correlated back without re-resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub range: DocRange,
    pub comment_id: i64,
}

/// The two parallel decoration layers for one document.
///
/// `highlights` and `markers` are index-aligned: entry *i* of each was
/// derived from the same comment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecorationSet {
    pub highlights: Vec<Highlight>,
    pub markers: Vec<DocRange>,
}

impl DecorationSet {
    /// Drops all ranges. Called before every re-render so stale decorations
    /// from the previous document never survive an editor switch.
    pub fn clear(&mut self) {
        self.highlights.clear();
        self.markers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }
}

/// Computes the decoration layers for `file_name` against `view`.
///
/// Comments whose anchor ends past the current end of the document are
/// skipped — the anchor went stale after external edits shrank the file.
/// The skip is per comment: one bad anchor never blanks the decorations of
/// the others, and the comment itself stays in the store, still resolvable
/// by id from the tree view.
pub fn decorations_for(
    comments: &[InlineComment],
    file_name: &str,
    view: &dyn DocumentView,
) -> DecorationSet {
    let mut set = DecorationSet::default();
    for comment in comments.iter().filter(|c| c.file_name == file_name) {
        let end_line = comment.end.document_line();
        if end_line >= view.line_count() {
            // Stale anchor — skip this comment, keep rendering the rest.
            continue;
        }
        set.highlights.push(Highlight {
            range: DocRange {
                start_line: comment.start.document_line(),
                start_character: comment.start.document_character(),
                end_line,
                end_character: comment.end.document_character(),
            },
            comment_id: comment.id,
        });
        set.markers.push(DocRange {
            start_line: end_line,
            start_character: 0,
            end_line,
            end_character: view.line_len(end_line),
        });
    }
    set
}
