use docsync_indexer::{FieldFlagVisibility, SearchIndex, TypeProjection};
use docsync_webhook::config::{ServiceConfig, build_state};
use pretty_assertions::assert_eq;
use std::time::{SystemTime, UNIX_EPOCH};

const FULL_CONFIG: &str = r#"{
    "sanity": { "project_id": "abc123", "dataset": "staging", "token": "read-token" },
    "algolia": { "app_id": "APP", "api_key": "KEY", "batch_size": 500 },
    "indexes": { "post": "posts", "page": "pages" },
    "projections": {
        "post": { "fields": ["title", "slug"], "blocks": ["body"] },
        "page": { "fields": ["title"] }
    },
    "visibility": { "pointer": "/isHidden", "visible_when": false }
}"#;

#[test]
fn parses_full_config() {
    let config = ServiceConfig::from_json(FULL_CONFIG).unwrap();

    assert_eq!(config.sanity.project_id, "abc123");
    assert_eq!(config.sanity.dataset, "staging");
    assert_eq!(config.sanity.token.as_deref(), Some("read-token"));
    assert_eq!(config.sanity.api_version, "2021-03-25");
    assert_eq!(config.algolia.batch_size, 500);
    assert_eq!(config.indexes.get("post").map(String::as_str), Some("posts"));
    assert_eq!(
        config.projections.get("post"),
        Some(&TypeProjection {
            fields: vec!["title".to_string(), "slug".to_string()],
            blocks: vec!["body".to_string()],
        })
    );
    assert_eq!(
        config.visibility,
        Some(FieldFlagVisibility::hidden_when_true("/isHidden"))
    );
}

#[test]
fn visibility_is_optional() {
    let config = ServiceConfig::from_json(
        r#"{"indexes": {"post": "posts"}, "projections": {"post": {}}}"#,
    )
    .unwrap();

    assert!(config.visibility.is_none());
    assert_eq!(config.projections["post"], TypeProjection::default());
}

#[test]
fn rejects_missing_indexes() {
    let err = ServiceConfig::from_json(r#"{"sanity": {"project_id": "p"}}"#).unwrap_err();
    assert!(err.to_string().contains("indexes"));
}

#[test]
fn rejects_malformed_json() {
    assert!(ServiceConfig::from_json("{").is_err());
}

#[test]
fn load_reads_file() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("docsync-config-{nanos}.json"));
    std::fs::write(&path, FULL_CONFIG).unwrap();

    let config = ServiceConfig::load(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.indexes.len(), 2);
}

#[test]
fn load_missing_file_names_path() {
    let err = ServiceConfig::load(std::path::Path::new("/nonexistent/docsync.json")).unwrap_err();
    assert!(err.to_string().contains("/nonexistent/docsync.json"));
}

#[test]
fn build_state_wires_every_type() {
    let config = ServiceConfig::from_json(FULL_CONFIG).unwrap();
    let state = build_state(config).unwrap();

    assert_eq!(state.indexer.types(), vec!["page", "post"]);
    assert_eq!(state.indexer.indexes().get("post").unwrap().name(), "posts");
}

#[test]
fn build_state_rejects_projection_gap() {
    let mut config = ServiceConfig::from_json(FULL_CONFIG).unwrap();
    config.projections.remove("page");

    let err = build_state(config).err().unwrap();
    assert!(format!("{err:#}").contains("page"));
}

#[test]
fn build_state_requires_algolia_credentials() {
    let mut config = ServiceConfig::from_json(FULL_CONFIG).unwrap();
    config.algolia.api_key.clear();

    assert!(build_state(config).is_err());
}

#[test]
fn rejects_bare_visibility_key() {
    let err = ServiceConfig::from_json(
        r#"{"indexes": {"post": "posts"}, "visibility": {"pointer": "isHidden", "visible_when": false}}"#,
    )
    .unwrap_err();
    assert!(err.to_string().contains("must be a JSON pointer"));
}
