use assert_cmd::Command;
use lazydin_core::{Author, Post};
use lazydin_store::Database;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

#[allow(deprecated)]
fn get_lazydin_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("lazydin")
}

/// Config pointing at a database holding two authors with one post each
fn seeded_config(dir: &Path) -> PathBuf {
    let db_path = dir.join("lazydin.sqlite");
    let runtime = tokio::runtime::Runtime::new().unwrap();
    runtime.block_on(async {
        let db = Database::connect(&db_path).await.unwrap();
        db.create_tables().await.unwrap();
        db.authors()
            .upsert(&Author::new("some-url", "Victor Raton", ""))
            .await
            .unwrap();
        db.authors()
            .upsert(&Author::new("some-other-url", "Captain Jack Sparrow", ""))
            .await
            .unwrap();
        db.posts()
            .upsert(&Post::new("urn:li:activity:1", "some-content", "some-url"))
            .await
            .unwrap();
        db.posts()
            .upsert(&Post::new(
                "urn:li:activity:2",
                "some-other-content",
                "some-other-url",
            ))
            .await
            .unwrap();
        db.pool().close().await;
    });

    let config = dir.join("config.json");
    let json = serde_json::json!({ "storage": db_path });
    std::fs::write(&config, json.to_string()).unwrap();
    config
}

#[test]
fn test_posts_lists_everything() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = seeded_config(temp_dir.path());

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config").arg(&config).arg("posts");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("2 posts"))
        .stdout(predicate::str::contains("urn:li:activity:1"))
        .stdout(predicate::str::contains("urn:li:activity:2"));
}

#[test]
fn test_posts_by_author_url() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = seeded_config(temp_dir.path());

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config")
        .arg(&config)
        .args(["--format", "json", "posts", "--author-url", "some-url"]);

    let output = cmd.assert().success().get_output().stdout.clone();
    let posts: serde_json::Value = serde_json::from_slice(&output).unwrap();

    let posts = posts.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["content"], "some-content");
}

#[test]
fn test_posts_by_author_name_as_table() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = seeded_config(temp_dir.path());

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config")
        .arg(&config)
        .args(["-f", "table", "posts", "--author-name", "ack"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("url;content;author_url\n"))
        .stdout(predicate::str::contains("urn:li:activity:2;some-other-content;some-other-url"))
        .stdout(predicate::str::contains("some-content;some-url").not());
}

#[test]
fn test_posts_filters_conflict() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = seeded_config(temp_dir.path());

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config").arg(&config).args([
        "posts",
        "--author-url",
        "some-url",
        "--author-name",
        "ack",
    ]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn test_posts_on_empty_database() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");
    let json = serde_json::json!({ "storage": temp_dir.path().join("empty.sqlite") });
    std::fs::write(&config, json.to_string()).unwrap();

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config").arg(&config).arg("posts");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No posts found."));
}

#[test]
fn test_posts_table_on_empty_database_prints_header() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config = temp_dir.path().join("config.json");
    let json = serde_json::json!({ "storage": temp_dir.path().join("empty.sqlite") });
    std::fs::write(&config, json.to_string()).unwrap();

    let mut cmd = Command::new(get_lazydin_bin());
    cmd.arg("--config")
        .arg(&config)
        .args(["-f", "table", "posts"]);

    cmd.assert()
        .success()
        .stdout(predicate::eq("url;content;author_url\n"));
}
