//! Span ↔ comment translation.
//!
//! Pure reads over a snapshot of the comment collection — no caching, every
//! call re-filters. The collection is small (dozens to low hundreds of
//! records), so a linear scan stays simpler than any index and is always
//! fresh.
//!
//! When anchors overlap after edits shifted lines, the first match in store
//! order wins. That tie-break is deliberate: deterministic, cheap, and the
//! overlap case is rare enough that interval precision buys nothing.

use crate::types::{InlineComment, Position, Span};

/// Finds the first comment for `file_name` whose anchor contains the given
/// 0-based document point.
pub fn find_by_point<'a>(
    comments: &'a [InlineComment],
    file_name: &str,
    line: u32,
    character: u32,
) -> Option<&'a InlineComment> {
    let point = Position::from_document(line, character);
    comments
        .iter()
        .find(|c| c.file_name == file_name && c.span().contains(point))
}

/// Finds the comment with `id`. Unambiguous — ids are unique.
pub fn find_by_id(comments: &[InlineComment], id: i64) -> Option<&InlineComment> {
    comments.iter().find(|c| c.id == id)
}

/// Finds the first comment for `file_name` whose anchor contains the whole
/// 0-based document range `start..=end`.
///
/// Used when navigating from the comment tree: the tree supplies the stored
/// start position as a collapsed (point) range.
pub fn find_by_span<'a>(
    comments: &'a [InlineComment],
    file_name: &str,
    start: (u32, u32),
    end: (u32, u32),
) -> Option<&'a InlineComment> {
    let inner = Span::new(
        Position::from_document(start.0, start.1),
        Position::from_document(end.0, end.1),
    );
    comments
        .iter()
        .find(|c| c.file_name == file_name && c.span().contains_span(inner))
}
