use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

#[allow(deprecated)]
fn get_lazydin_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("lazydin")
}

fn lazydin(config: &Path) -> Command {
    let mut cmd = Command::new(get_lazydin_bin());
    cmd.env_remove("LAZYDIN_USERNAME")
        .env_remove("LAZYDIN_PASSWORD")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn test_search_command_help() {
    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("search").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Search posts"))
        .stdout(predicate::str::contains("--query"))
        .stdout(predicate::str::contains("--output"))
        .stdout(predicate::str::contains("--sep"));
}

#[test]
fn test_search_requires_query() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");

    lazydin(&config)
        .arg("search")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--query"));
}

#[test]
fn test_search_without_credentials_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");

    lazydin(&config)
        .arg("search")
        .arg("-q")
        .arg("rust")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));

    // The default config is written on first use
    assert!(config.exists());
}

#[test]
fn test_search_rejects_non_csv_output_before_launching_chrome() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");
    let output = temp_dir.path().join("posts.json");

    lazydin(&config)
        .args(["-u", "someone@example.com", "-p", "secret"])
        .arg("search")
        .arg("-q")
        .arg("rust")
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("only supported is .csv"));

    assert!(!output.exists());
}

#[test]
fn test_search_rejects_multi_character_separator() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");
    let output = temp_dir.path().join("posts.csv");

    lazydin(&config)
        .args(["-u", "someone@example.com", "-p", "secret"])
        .args(["search", "-q", "rust", "--sep", "::"])
        .arg("-o")
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid CSV separator"));
}

#[test]
fn test_actions_rejects_invalid_url() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");

    lazydin(&config)
        .args(["-u", "someone@example.com", "-p", "secret"])
        .args(["actions", "--url", "not a url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid profile URL"));
}
