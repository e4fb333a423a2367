//! Integration test for anchor resolution and decoration rendering.
//!
//! Exercises: find_by_point / find_by_id / find_by_span, the store-order
//! tie-break, stale-anchor isolation in the renderer, and the selection
//! dispatcher guard.

use marginalia_core::dispatch::{dispatch_selection, DispatchOutcome};
use marginalia_core::render::{decorations_for, DocumentView};
use marginalia_core::resolve::{find_by_id, find_by_point, find_by_span};
use marginalia_core::store::CommentStore;
use marginalia_core::types::{InlineComment, Position, Span};

/// A fake document: one entry per line, each the line's character length.
struct FakeView(Vec<u32>);

impl DocumentView for FakeView {
    fn line_count(&self) -> u32 {
        self.0.len() as u32
    }

    fn line_len(&self, line: u32) -> u32 {
        self.0.get(line as usize).copied().unwrap_or(0)
    }
}

fn comment(id: i64, file: &str, start: (u32, u32), end: (u32, u32)) -> InlineComment {
    InlineComment {
        id,
        file_name: file.to_owned(),
        start: Position {
            line: start.0,
            character: start.1,
        },
        end: Position {
            line: end.0,
            character: end.1,
        },
        title: format!("comment {id}"),
        comment: String::new(),
        priority: None,
    }
}

#[tokio::test]
async fn point_resolution_against_a_real_store() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = CommentStore::new(dir.path().join(".marginalia"));

    store
        .append(
            "a.ts",
            Span::new(
                Position { line: 2, character: 1 },
                Position { line: 2, character: 10 },
            ),
            "Naming",
            "rename x",
            None,
        )
        .await
        .unwrap();

    let comments = store.comments_for_file("a.ts").await.unwrap();
    assert_eq!(comments.len(), 1);

    // Document (0-based) line 1 is stored line 2 — inside the anchor.
    let hit = find_by_point(&comments, "a.ts", 1, 5);
    assert_eq!(hit.map(|c| c.title.as_str()), Some("Naming"));

    // Far below the anchor: no match.
    assert!(find_by_point(&comments, "a.ts", 5, 0).is_none());

    // Same point, different file: no match.
    assert!(find_by_point(&comments, "b.ts", 1, 5).is_none());
}

#[test]
fn overlap_tie_break_is_store_order_every_call() {
    let comments = vec![
        comment(1, "a.rs", (3, 1), (6, 8)),
        comment(2, "a.rs", (5, 1), (9, 4)),
    ];

    // Document line 4 = stored line 5, inside both anchors.
    for _ in 0..3 {
        let hit = find_by_point(&comments, "a.rs", 4, 2).unwrap();
        assert_eq!(hit.id, 1, "earlier-inserted comment must win the overlap");
    }
}

#[test]
fn find_by_id_scans_directly() {
    let comments = vec![comment(10, "a.rs", (1, 1), (1, 5)), comment(20, "b.rs", (2, 1), (2, 5))];
    assert_eq!(find_by_id(&comments, 20).unwrap().file_name, "b.rs");
    assert!(find_by_id(&comments, 30).is_none());
}

#[test]
fn find_by_span_requires_full_containment() {
    let comments = vec![comment(1, "a.rs", (2, 1), (4, 10))];

    // A collapsed range at the anchor's stored start (document coords).
    assert!(find_by_span(&comments, "a.rs", (1, 0), (1, 0)).is_some());

    // A range poking past the anchor's end is not contained.
    assert!(find_by_span(&comments, "a.rs", (1, 0), (4, 2)).is_none());
}

#[test]
fn renderer_converts_to_document_coordinates() {
    let view = FakeView(vec![12, 30, 7]);
    let comments = vec![comment(1, "a.rs", (2, 1), (2, 10))];

    let set = decorations_for(&comments, "a.rs", &view);
    assert_eq!(set.highlights.len(), 1);
    let h = set.highlights[0];
    assert_eq!(
        (h.range.start_line, h.range.start_character, h.range.end_line, h.range.end_character),
        (1, 0, 1, 9),
        "stored 1-based span should shift down by one on both axes"
    );

    // The marker covers the full extent of the span's last line.
    let m = set.markers[0];
    assert_eq!((m.start_line, m.start_character, m.end_line, m.end_character), (1, 0, 1, 30));
}

#[test]
fn stale_anchor_is_skipped_without_blanking_the_rest() {
    let view = FakeView(vec![10, 10, 10]);
    let comments = vec![
        comment(1, "a.rs", (1, 1), (1, 4)),
        comment(2, "a.rs", (8, 1), (9, 2)), // past the end of the document
        comment(3, "a.rs", (3, 2), (3, 6)),
    ];

    let set = decorations_for(&comments, "a.rs", &view);
    assert_eq!(set.highlights.len(), 2, "exactly the live anchors draw");
    assert_eq!(set.markers.len(), 2);
    assert_eq!(set.highlights[0].comment_id, 1);
    assert_eq!(set.highlights[1].comment_id, 3);
}

#[test]
fn recomputation_is_idempotent() {
    let view = FakeView(vec![20, 20, 20, 20]);
    let comments = vec![
        comment(1, "a.rs", (1, 1), (2, 5)),
        comment(2, "a.rs", (4, 1), (4, 9)),
        comment(3, "b.rs", (1, 1), (1, 2)), // other file, filtered out
    ];

    let first = decorations_for(&comments, "a.rs", &view);
    let second = decorations_for(&comments, "a.rs", &view);
    assert_eq!(first, second);
    assert_eq!(first.highlights.len(), 2);
}

#[test]
fn dispatcher_guards_then_resolves_by_containment() {
    let view = FakeView(vec![20, 20, 20]);
    let comments = vec![
        comment(7, "a.rs", (1, 1), (1, 6)),
        comment(8, "a.rs", (1, 4), (2, 3)),
    ];
    let set = decorations_for(&comments, "a.rs", &view);

    // A drag-select never reaches the containment scan.
    assert_eq!(
        dispatch_selection(&set.highlights, (0, 1), (0, 5)),
        DispatchOutcome::Ignored
    );

    // A point inside the overlap resolves to the earlier highlight.
    assert_eq!(
        dispatch_selection(&set.highlights, (0, 4), (0, 4)),
        DispatchOutcome::Resolved { comment_id: 7 }
    );

    // A point outside every highlight falls back to idle.
    assert_eq!(
        dispatch_selection(&set.highlights, (2, 10), (2, 10)),
        DispatchOutcome::NoMatch
    );
}
