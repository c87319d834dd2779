use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_lazydin_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("lazydin")
}

#[test]
fn test_create_storage_creates_database_and_updates_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");
    let db_path = temp_dir.path().join("data").join("posts.sqlite");

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config")
        .arg(&config)
        .arg("create-storage")
        .arg(&db_path);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Storage ready"));

    assert!(db_path.exists());
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config).unwrap()).unwrap();
    assert_eq!(saved["storage"], db_path.to_str().unwrap());
}

#[test]
fn test_create_credentials_help() {
    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("create-credentials").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Prompt for login credentials"));
}

#[test]
fn test_main_help_lists_commands() {
    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("search"))
        .stdout(predicate::str::contains("posts"))
        .stdout(predicate::str::contains("actions"))
        .stdout(predicate::str::contains("create-credentials"))
        .stdout(predicate::str::contains("create-storage"));
}
