mod common;

use common::create_test_dir;
use sharesync::{ConfigError, ConfigStore, SyncProfile};

fn store(temp: &tempfile::TempDir) -> ConfigStore {
    ConfigStore::at(temp.path().join(".sharesync/config.json"))
}

#[tokio::test]
async fn test_missing_config_reads_as_empty() {
    let temp_dir = create_test_dir();
    let config = store(&temp_dir).read().await.expect("Should read default config");

    assert!(config.profiles.is_empty());
    assert!(config.exclusions.is_empty());
    assert_eq!(config.fingerprint_workers, 4);
}

#[tokio::test]
async fn test_save_and_load_profile() {
    let temp_dir = create_test_dir();
    let left = temp_dir.path().join("company");
    let right = temp_dir.path().join("client");
    std::fs::create_dir_all(&left).unwrap();
    std::fs::create_dir_all(&right).unwrap();

    let store = store(&temp_dir);
    store
        .save_profile(
            "acme",
            SyncProfile::new(&left, &right).with_labels("Company", "Acme"),
        )
        .await
        .expect("Should save profile");

    let profile = store.load_profile("acme").await.expect("Should load profile");
    assert_eq!(profile.left_label, "Company");
    assert_eq!(profile.right_label, "Acme");

    let roots = profile.roots();
    assert_eq!(roots.left.label, "Company");
    assert!(roots.left.path.ends_with("company"));
    assert!(roots.right.path.ends_with("client"));

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("\"schemaVersion\""));
    assert!(raw.contains("\"leftDir\""));
}

#[tokio::test]
async fn test_unknown_profile() {
    let temp_dir = create_test_dir();
    let result = store(&temp_dir).load_profile("nobody").await;
    assert!(matches!(result, Err(ConfigError::ProfileNotFound(name)) if name == "nobody"));
}

#[tokio::test]
async fn test_profile_with_missing_directory_is_rejected() {
    let temp_dir = create_test_dir();
    let existing = temp_dir.path().join("exists");
    std::fs::create_dir_all(&existing).unwrap();

    let store = store(&temp_dir);
    let result = store
        .save_profile("broken", SyncProfile::new(&existing, temp_dir.path().join("missing")))
        .await;

    assert!(matches!(result, Err(ConfigError::DirectoryNotFound(_))));
    assert!(!store.path().exists());
}

#[tokio::test]
async fn test_exclusions_are_idempotent_and_persisted() {
    let temp_dir = create_test_dir();
    let store = store(&temp_dir);

    assert!(store.exclude_dir("excluded_dir").await.unwrap());
    assert!(!store.exclude_dir("excluded_dir").await.unwrap());
    assert!(store.exclude_file("Thumbs.db").await.unwrap());

    let exclusions = store.load_exclusion_set().await.unwrap();
    assert!(exclusions.is_excluded("excluded_dir/a.txt"));
    assert!(exclusions.is_excluded("x/Thumbs.db"));

    assert!(store.include_dir("excluded_dir").await.unwrap());
    assert!(!store.include_dir("excluded_dir").await.unwrap());
    assert!(!store.include_file("never_added.txt").await.unwrap());

    let exclusions = store.load_exclusion_set().await.unwrap();
    assert!(!exclusions.is_excluded("excluded_dir/a.txt"));
    assert!(exclusions.is_excluded("Thumbs.db"));
}

#[tokio::test]
async fn test_malformed_config_is_an_error() {
    let temp_dir = create_test_dir();
    let store = store(&temp_dir);
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{ not json").unwrap();

    assert!(matches!(store.read().await, Err(ConfigError::JsonError(_))));
}
