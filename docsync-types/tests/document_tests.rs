use docsync_types::{Document, DocumentId, Error};
use pretty_assertions::assert_eq;
use serde_json::json;

fn make_post() -> Document {
    Document::from_value(json!({
        "_id": "post-1",
        "_type": "post",
        "_rev": "r42",
        "title": "Hello",
        "hidden": false,
        "views": 12,
        "slug": { "current": "hello-world" },
        "a/b": "escaped"
    }))
    .unwrap()
}

// ── Decoding ─────────────────────────────────────────────────────

#[test]
fn reserved_keys_are_lifted() {
    let doc = make_post();
    assert_eq!(doc.id, DocumentId::new("post-1"));
    assert_eq!(doc.doc_type, "post");
    assert_eq!(doc.rev.as_deref(), Some("r42"));
    assert!(!doc.fields.contains_key("_id"));
    assert!(!doc.fields.contains_key("_type"));
    assert!(!doc.fields.contains_key("_rev"));
}

#[test]
fn other_keys_land_in_fields() {
    let doc = make_post();
    assert_eq!(doc.fields["title"], "Hello");
    assert_eq!(doc.fields["views"], 12);
}

#[test]
fn missing_rev_is_none() {
    let doc = Document::from_value(json!({"_id": "a", "_type": "page"})).unwrap();
    assert!(doc.rev.is_none());
    assert!(doc.fields.is_empty());
}

#[test]
fn missing_id_is_rejected() {
    let err = Document::from_value(json!({"_type": "page"})).unwrap_err();
    assert!(matches!(err, Error::InvalidDocument(_)));
    assert!(err.to_string().contains("_id"));
}

#[test]
fn missing_type_is_rejected() {
    let err = Document::from_value(json!({"_id": "a"})).unwrap_err();
    assert!(err.to_string().contains("_type"));
}

#[test]
fn non_object_is_rejected() {
    assert!(Document::from_value(json!(["a"])).is_err());
}

#[test]
fn serialize_restores_reserved_keys() {
    let doc = Document::new("a", "page").with_rev("r1").with_field("title", "T");
    let value = serde_json::to_value(&doc).unwrap();
    assert_eq!(value, json!({"_id": "a", "_type": "page", "_rev": "r1", "title": "T"}));
}

#[test]
fn serialize_omits_absent_rev() {
    let value = serde_json::to_value(Document::new("a", "page")).unwrap();
    assert!(value.get("_rev").is_none());
}

// ── JSON pointer helpers ─────────────────────────────────────────

#[test]
fn get_str_top_level() {
    assert_eq!(make_post().get_str("/title"), Some("Hello"));
}

#[test]
fn get_str_nested() {
    assert_eq!(make_post().get_str("/slug/current"), Some("hello-world"));
}

#[test]
fn get_str_escaped_key() {
    assert_eq!(make_post().get_str("/a~1b"), Some("escaped"));
}

#[test]
fn get_bool_and_number() {
    let doc = make_post();
    assert_eq!(doc.get_bool("/hidden"), Some(false));
    assert_eq!(doc.get_number("/views"), Some(12.0));
}

#[test]
fn get_wrong_type_is_none() {
    let doc = make_post();
    assert_eq!(doc.get_str("/views"), None);
    assert_eq!(doc.get_bool("/title"), None);
}

#[test]
fn get_missing_path_is_none() {
    let doc = make_post();
    assert!(doc.get("/nope").is_none());
    assert!(doc.get("/slug/nope").is_none());
}

#[test]
fn get_without_leading_slash_is_none() {
    assert!(make_post().get("title").is_none());
}

#[test]
fn doc_ref_carries_id_and_type() {
    let r = make_post().doc_ref();
    assert_eq!(r.id.as_str(), "post-1");
    assert_eq!(r.doc_type, "post");
}
