//! Integration tests for the `tune publish` command.
//!
//! Everything here fails before any network traffic: token resolution, repo
//! id validation, and artifact directory checks all run first.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn tune() -> Command {
    let mut cmd = Command::cargo_bin("tune").unwrap();
    cmd.env_remove("HF_TOKEN");
    cmd
}

#[test]
fn test_publish_without_token_fails() {
    let temp = TempDir::new().unwrap();

    tune()
        .current_dir(temp.path())
        .args([
            "publish",
            "--model",
            temp.path().to_str().unwrap(),
            "--repo",
            "acme/demo-7b",
            "--base-model",
            "base",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no hub token available"));
}

#[test]
fn test_publish_rejects_bad_repo_id() {
    let temp = TempDir::new().unwrap();

    tune()
        .current_dir(temp.path())
        .args([
            "publish",
            "--model",
            temp.path().to_str().unwrap(),
            "--repo",
            "missing-namespace",
            "--base-model",
            "base",
            "--token",
            "tok",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid repository id"));
}

#[test]
fn test_publish_rejects_missing_artifact_dir() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("not-there");

    tune()
        .current_dir(temp.path())
        .args([
            "publish",
            "--model",
            missing.to_str().unwrap(),
            "--repo",
            "acme/demo-7b",
            "--base-model",
            "base",
            "--token",
            "tok",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn test_publish_unknown_trained_id_fails() {
    let temp = TempDir::new().unwrap();

    tune()
        .current_dir(temp.path())
        .args([
            "publish",
            "--model",
            "trained:no-such-job",
            "--repo",
            "acme/demo-7b",
            "--token",
            "tok",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("trained model not found"));
}
