//! Integration test for the store lifecycle.
//!
//! Exercises: bootstrap, load, append, update, the two-phase remove, the
//! general-comments draft, rubric loading, and the refresh channel.

use marginalia_core::error::StoreError;
use marginalia_core::store::{Clock, CommentStore, Mutation, Refresh};
use marginalia_core::types::{GeneralDraft, Position, Priority, Span};
use tokio::sync::mpsc;

/// A clock stuck at one millisecond — appends must still get distinct ids.
struct FrozenClock(i64);

impl Clock for FrozenClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

fn temp_store() -> (tempfile::TempDir, CommentStore) {
    let dir = tempfile::TempDir::new().unwrap();
    let store_dir = dir.path().join(".marginalia");
    let store = CommentStore::with_clock(&store_dir, Box::new(FrozenClock(1_700_000_000_000)));
    (dir, store)
}

fn span(start: (u32, u32), end: (u32, u32)) -> Span {
    Span::new(
        Position {
            line: start.0,
            character: start.1,
        },
        Position {
            line: end.0,
            character: end.1,
        },
    )
}

#[tokio::test]
async fn full_store_lifecycle() {
    let (dir, mut store) = temp_store();
    let (tx, mut rx) = mpsc::unbounded_channel::<Refresh>();
    store.attach_refresh(tx);

    // First load bootstraps the skeleton documents and returns empty.
    let comments = store.load_inline().await.unwrap();
    assert!(comments.is_empty(), "fresh store should be empty");
    let skeleton = std::fs::read_to_string(
        dir.path().join(".marginalia").join("inline-comments.json"),
    )
    .unwrap();
    assert_eq!(skeleton, r#"{"inlineComments":[]}"#, "skeleton shape");

    // Round-trip: append then load yields the same record, id assigned.
    let added = store
        .append("src/lib.rs", span((2, 1), (2, 10)), "Naming", "rename x", None)
        .await
        .unwrap();
    assert!(added.id > 0, "id should be assigned");
    let loaded = store.load_inline().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0], added, "load should round-trip the appended record");
    assert!(rx.try_recv().is_ok(), "append should fire a refresh");

    // Id uniqueness under a frozen clock: every append gets a fresh id.
    let b = store
        .append("src/lib.rs", span((4, 1), (4, 4)), "B", "", Some(Priority::High))
        .await
        .unwrap();
    let c = store
        .append("src/main.rs", span((1, 1), (1, 8)), "", "third", None)
        .await
        .unwrap();
    assert_ne!(added.id, b.id);
    assert_ne!(b.id, c.id);
    assert!(b.id > added.id && c.id > b.id, "ids should stay monotonic");
    let all = store.load_inline().await.unwrap();
    for id in [added.id, b.id, c.id] {
        assert!(
            marginalia_core::resolve::find_by_id(&all, id).is_some(),
            "every assigned id should resolve"
        );
    }
    rx.try_recv().unwrap();
    rx.try_recv().unwrap();

    // Per-file filtering uses the relative path only.
    let for_lib = store.comments_for_file("src/lib.rs").await.unwrap();
    assert_eq!(for_lib.len(), 2);

    // No-op update: identical fields never write and never fire a refresh.
    let outcome = store
        .update(added.id, "Naming", "rename x", None)
        .await
        .unwrap();
    assert_eq!(outcome, Mutation::Unchanged);
    assert!(rx.try_recv().is_err(), "no-op update must not fire a refresh");
    assert_eq!(store.load_inline().await.unwrap()[0], added);

    // Blank title and body on update is also a silent no-op.
    let outcome = store.update(added.id, " ", "", None).await.unwrap();
    assert_eq!(outcome, Mutation::Unchanged);

    // Real update rewrites the payload but never the anchor.
    let outcome = store
        .update(added.id, "Naming", "rename x to width", Some(Priority::Low))
        .await
        .unwrap();
    assert_eq!(outcome, Mutation::Applied);
    assert!(rx.try_recv().is_ok(), "update should fire a refresh");
    let updated = store.load_inline().await.unwrap()[0].clone();
    assert_eq!(updated.comment, "rename x to width");
    assert_eq!(updated.priority, Some(Priority::Low));
    assert_eq!(updated.start, added.start, "anchor must not move on update");
    assert_eq!(updated.end, added.end);

    // Unknown id: no-op, no refresh.
    let outcome = store.update(42, "x", "y", None).await.unwrap();
    assert_eq!(outcome, Mutation::NotFound);
    assert!(rx.try_recv().is_err());

    // Two-phase delete: request alone changes nothing.
    let pending = store.request_remove(b.id);
    assert_eq!(pending.comment_id(), b.id);
    assert_eq!(store.load_inline().await.unwrap().len(), 3);

    // Confirm removes exactly one record and leaves the rest untouched.
    let outcome = store.confirm_remove(pending).await.unwrap();
    assert_eq!(outcome, Mutation::Applied);
    assert!(rx.try_recv().is_ok(), "delete should fire a refresh");
    let remaining = store.load_inline().await.unwrap();
    assert_eq!(remaining.len(), 2);
    assert_eq!(remaining[0], updated);
    assert_eq!(remaining[1], c);

    // Confirming a delete for a vanished id leaves the store unchanged.
    let outcome = store.confirm_remove(store.request_remove(b.id)).await.unwrap();
    assert_eq!(outcome, Mutation::NotFound);
    assert!(rx.try_recv().is_err());
    assert_eq!(store.load_inline().await.unwrap().len(), 2);

    // Abandoning a pending delete (drop) is a full cancel.
    drop(store.request_remove(c.id));
    assert_eq!(store.load_inline().await.unwrap().len(), 2);

    // Persistence: a second store over the same directory sees the data.
    let reopened = CommentStore::new(dir.path().join(".marginalia"));
    let persisted = reopened.load_inline().await.unwrap();
    assert_eq!(persisted.len(), 2, "comments should persist across stores");
    assert_eq!(persisted[1], c);
}

#[tokio::test]
async fn blank_input_is_rejected_before_any_write() {
    let (_dir, store) = temp_store();
    store.bootstrap().await.unwrap();

    let result = store
        .append("a.ts", span((2, 1), (2, 10)), "", "   ", None)
        .await;
    assert!(
        matches!(result, Err(StoreError::Validation(_))),
        "whitespace-only input should be rejected"
    );
    assert!(store.load_inline().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_document_propagates_parse_error() {
    let (dir, store) = temp_store();
    store.bootstrap().await.unwrap();
    std::fs::write(
        dir.path().join(".marginalia").join("inline-comments.json"),
        "{not json",
    )
    .unwrap();

    let result = store.load_inline().await;
    assert!(matches!(result, Err(StoreError::Parse { .. })));
    // The corrupt file is never auto-repaired.
    let raw = std::fs::read_to_string(
        dir.path().join(".marginalia").join("inline-comments.json"),
    )
    .unwrap();
    assert_eq!(raw, "{not json");
}

#[tokio::test]
async fn bootstrap_requires_the_workspace_root() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("gone").join(".marginalia");
    let store = CommentStore::new(missing);
    let result = store.bootstrap().await;
    assert!(matches!(result, Err(StoreError::WorkspaceMissing { .. })));
}

#[tokio::test]
async fn general_draft_replaces_wholesale_and_skips_empty_entries() {
    let (_dir, store) = temp_store();

    let draft = vec![
        GeneralDraft {
            comment: "Clear structure".into(),
            rubric_id: 1,
            score: Some(4.0),
        },
        GeneralDraft {
            comment: String::new(),
            rubric_id: 2,
            score: None,
        },
        GeneralDraft {
            comment: String::new(),
            rubric_id: 3,
            score: Some(2.5),
        },
    ];
    let saved = store.replace_general(&draft).await.unwrap();
    assert_eq!(saved, 2, "the empty no-score entry should be dropped");

    let loaded = store.load_general().await.unwrap();
    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].rubric_id, 1);
    assert_eq!(loaded[1].score, Some(2.5));
    assert_ne!(loaded[0].id, loaded[1].id);

    // A fully empty draft is rejected and the previous draft kept.
    let result = store
        .replace_general(&[GeneralDraft {
            comment: String::new(),
            rubric_id: 1,
            score: None,
        }])
        .await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(store.load_general().await.unwrap().len(), 2);

    // A new draft replaces the old one entirely, not additively.
    store
        .replace_general(&[GeneralDraft {
            comment: "Second pass".into(),
            rubric_id: 2,
            score: None,
        }])
        .await
        .unwrap();
    let loaded = store.load_general().await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].comment, "Second pass");
}

#[tokio::test]
async fn rubrics_round_trip_their_stringly_score_flag() {
    let (dir, store) = temp_store();
    store.bootstrap().await.unwrap();
    std::fs::write(
        dir.path().join(".marginalia").join("rubrics.json"),
        r#"{"rubrics":[
            {"id":1,"title":"Correctness","description":"Does it work","has_score":"true"},
            {"id":2,"title":"Style","description":"Reads well","has_score":"false"}
        ]}"#,
    )
    .unwrap();

    let rubrics = store.load_rubrics().await.unwrap();
    assert_eq!(rubrics.len(), 2);
    assert!(rubrics[0].wants_score());
    assert!(!rubrics[1].wants_score());
    assert_eq!(rubrics[1].has_score, "false");
}
