//! Session store tests
//! Run with: cargo test --test session_store_test

use serde_json::json;
use wa_groupbot::domain::entities::SessionCredentials;
use wa_groupbot::domain::traits::SessionStore;
use wa_groupbot::infrastructure::storage::FileSessionStore;

#[tokio::test]
async fn test_missing_directory_is_a_fresh_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("auth_info"));

    let session = store.load().await.unwrap();

    assert!(session.is_fresh());
    assert!(session.keys.is_empty());
}

#[tokio::test]
async fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path().join("auth_info"));

    let mut session = SessionCredentials::default();
    session.merge(json!({"noiseKey": {"public": "abc"}, "registered": true}).as_object().cloned().unwrap());
    session.keys.insert("pre-key-1".to_string(), json!({"keyId": 1}));
    store.save(&session).await.unwrap();

    assert!(dir.path().join("auth_info/creds.json").exists());
    assert!(dir.path().join("auth_info/pre-key-1.json").exists());
    assert!(!dir.path().join("auth_info/creds.json.tmp").exists());

    let loaded = store.load().await.unwrap();
    assert_eq!(loaded, session);
}

#[test]
fn test_key_names_are_made_file_safe() {
    assert_eq!(FileSessionStore::file_name("session-1:2@s.whatsapp.net"), "session-1%3A2@s.whatsapp.net.json");
    assert_eq!(FileSessionStore::file_name("app-state/sync"), "app-state%2Fsync.json");
    assert_eq!(FileSessionStore::key_name("app-state%2Fsync"), "app-state/sync");
    assert_eq!(FileSessionStore::key_name("100%25%3Aa"), "100%:a");
}

#[tokio::test]
async fn test_escaped_key_names_survive_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(dir.path());

    let mut session = SessionCredentials::default();
    for key in ["app-state/sync", "session-1:2@s.whatsapp.net", "pre-key-1", "odd%2Fname"] {
        session.keys.insert(key.to_string(), json!({"key": key}));
    }
    store.save(&session).await.unwrap();

    let loaded = store.load().await.unwrap();
    let keys: Vec<&str> = loaded.keys.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["app-state/sync", "odd%2Fname", "pre-key-1", "session-1:2@s.whatsapp.net"]);
    assert_eq!(loaded, session);
}

#[tokio::test]
async fn test_non_json_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("creds.json"), r#"{"me": {"id": "1"}}"#).unwrap();
    std::fs::write(dir.path().join("README"), "not a key").unwrap();

    let loaded = FileSessionStore::new(dir.path()).load().await.unwrap();

    assert_eq!(loaded.creds["me"], json!({"id": "1"}));
    assert!(loaded.keys.is_empty());
}

#[tokio::test]
async fn test_corrupt_creds_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("creds.json"), "{not json").unwrap();

    assert!(FileSessionStore::new(dir.path()).load().await.is_err());
}
