use docsync_indexer::index::mock::MockIndex;
use docsync_indexer::{ChangeSet, DispatchReport, Dispatcher, IndexerError, TypeIndexMap, WriteOp};
use docsync_types::{DocumentId, IndexRecord};
use pretty_assertions::assert_eq;
use std::sync::Arc;

struct Fixture {
    posts: Arc<MockIndex>,
    pages: Arc<MockIndex>,
    dispatcher: Dispatcher,
}

fn fixture() -> Fixture {
    let posts = MockIndex::shared("posts");
    let pages = MockIndex::shared("pages");
    let map = TypeIndexMap::new()
        .with_index("post", posts.clone())
        .with_index("page", pages.clone());
    Fixture {
        posts,
        pages,
        dispatcher: Dispatcher::new(Arc::new(map)),
    }
}

fn record(id: &str, record_type: &str) -> IndexRecord {
    IndexRecord::new(id, record_type)
}

fn ids(values: &[&str]) -> Vec<DocumentId> {
    values.iter().map(|v| DocumentId::from(*v)).collect()
}

// ── Saves ────────────────────────────────────────────────────────

#[tokio::test]
async fn saves_are_routed_by_type() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![record("p1", "post"), record("g1", "page")],
        to_delete: vec![],
    };

    let report = f.dispatcher.dispatch(&changes).await.unwrap();

    assert_eq!(f.posts.save_calls(), vec![vec![record("p1", "post")]]);
    assert_eq!(f.pages.save_calls(), vec![vec![record("g1", "page")]]);
    assert_eq!(report.saved.get("posts"), Some(&1));
    assert_eq!(report.saved.get("pages"), Some(&1));
}

#[tokio::test]
async fn one_batch_per_type() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![record("p1", "post"), record("g1", "page"), record("p2", "post")],
        to_delete: vec![],
    };

    f.dispatcher.dispatch(&changes).await.unwrap();

    let calls = f.posts.save_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec![record("p1", "post"), record("p2", "post")]);
}

#[tokio::test]
async fn empty_partitions_issue_no_call() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![record("p1", "post")],
        to_delete: vec![],
    };

    let report = f.dispatcher.dispatch(&changes).await.unwrap();

    assert_eq!(f.posts.save_calls().len(), 1);
    assert!(f.pages.save_calls().is_empty());
    assert!(!report.saved.contains_key("pages"));
}

#[tokio::test]
async fn unknown_record_type_is_not_saved() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![record("a1", "author")],
        to_delete: vec![],
    };

    let report = f.dispatcher.dispatch(&changes).await.unwrap();

    assert!(f.posts.save_calls().is_empty());
    assert!(f.pages.save_calls().is_empty());
    assert!(report.saved.is_empty());
}

// ── Deletes ──────────────────────────────────────────────────────

#[tokio::test]
async fn deletes_are_broadcast_to_every_index() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![],
        to_delete: ids(&["z"]),
    };

    let report = f.dispatcher.dispatch(&changes).await.unwrap();

    assert_eq!(f.posts.delete_calls(), vec![ids(&["z"])]);
    assert_eq!(f.pages.delete_calls(), vec![ids(&["z"])]);
    assert_eq!(report.deleted_from, vec!["pages", "posts"]);
    assert_eq!(report.deleted_ids, 1);
}

#[tokio::test]
async fn no_delete_call_when_nothing_to_delete() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![record("p1", "post")],
        to_delete: vec![],
    };

    let report = f.dispatcher.dispatch(&changes).await.unwrap();

    assert!(f.posts.delete_calls().is_empty());
    assert!(f.pages.delete_calls().is_empty());
    assert!(report.deleted_from.is_empty());
}

#[tokio::test]
async fn deleting_absent_ids_is_harmless() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![],
        to_delete: ids(&["never-indexed"]),
    };

    f.dispatcher.dispatch(&changes).await.unwrap();
    assert!(f.posts.objects().is_empty());
}

#[tokio::test]
async fn empty_change_set_touches_nothing() {
    let f = fixture();

    let report = f.dispatcher.dispatch(&ChangeSet::default()).await.unwrap();

    assert!(f.posts.save_calls().is_empty());
    assert!(f.posts.delete_calls().is_empty());
    assert!(f.pages.save_calls().is_empty());
    assert!(f.pages.delete_calls().is_empty());
    assert_eq!(report, DispatchReport::default());
}

// ── Ordering ─────────────────────────────────────────────────────

#[tokio::test]
async fn saves_land_before_deletes() {
    let f = fixture();
    let changes = ChangeSet {
        to_save: vec![record("p1", "post")],
        to_delete: ids(&["p1"]),
    };

    f.dispatcher.dispatch(&changes).await.unwrap();

    // A delete issued before the save completed would leave p1 behind.
    assert_eq!(f.posts.save_calls().len(), 1);
    assert_eq!(f.posts.delete_calls(), vec![ids(&["p1"])]);
    assert!(f.posts.objects().is_empty());
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn save_failure_names_index_and_skips_deletes() {
    let f = fixture();
    f.pages.fail_saves(Some("quota exceeded"));
    let changes = ChangeSet {
        to_save: vec![record("p1", "post"), record("g1", "page")],
        to_delete: ids(&["z"]),
    };

    let err = f.dispatcher.dispatch(&changes).await.unwrap_err();

    match err {
        IndexerError::IndexWrite { index, op, .. } => {
            assert_eq!(index, "pages");
            assert_eq!(op, WriteOp::Save);
        }
        other => panic!("unexpected error: {other}"),
    }
    // The other save still ran; nothing was rolled back.
    assert!(f.posts.object("p1").is_some());
    assert!(f.posts.delete_calls().is_empty());
    assert!(f.pages.delete_calls().is_empty());
}

#[tokio::test]
async fn delete_failure_does_not_stop_other_indices() {
    let f = fixture();
    f.posts.fail_deletes(Some("unavailable"));
    let changes = ChangeSet {
        to_save: vec![],
        to_delete: ids(&["z"]),
    };

    let err = f.dispatcher.dispatch(&changes).await.unwrap_err();

    assert!(matches!(
        err,
        IndexerError::IndexWrite { op: WriteOp::Delete, .. }
    ));
    assert!(err.to_string().contains("posts"));
    assert_eq!(f.pages.delete_calls(), vec![ids(&["z"])]);
}
