//! Corruption recovery tests for liftlog.
//!
//! These tests verify the system can handle:
//! - Corrupted store files
//! - Orphaned entities left behind by partial writes
//! - Missing files

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn cli(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("liftlog"));
    cmd.env("XDG_CONFIG_HOME", dir.join("config"))
        .env_remove("RUST_LOG")
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn store_path(dir: &Path) -> PathBuf {
    dir.join("data/store.json")
}

fn write_corrupted_store(dir: &Path) {
    fs::create_dir_all(dir.join("data")).unwrap();
    fs::write(store_path(dir), "{ invalid json }}}}").expect("Failed to write corrupted store");
}

#[test]
fn test_corrupted_store_is_not_overwritten() {
    let temp_dir = setup_test_dir();
    write_corrupted_store(temp_dir.path());

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse store file"));

    // Mutating commands must not replace the unreadable file with an empty store
    cli(temp_dir.path()).arg("seed").assert().failure();

    let contents = fs::read_to_string(store_path(temp_dir.path())).unwrap();
    assert_eq!(contents, "{ invalid json }}}}");
}

#[test]
fn test_import_over_corrupted_store() {
    let source = setup_test_dir();
    cli(source.path()).arg("seed").assert().success();
    let export_path = source.path().join("backup.json");
    cli(source.path())
        .arg("export")
        .arg("--out")
        .arg(&export_path)
        .assert()
        .success();

    let temp_dir = setup_test_dir();
    write_corrupted_store(temp_dir.path());

    cli(temp_dir.path())
        .arg("import")
        .arg(&export_path)
        .assert()
        .success();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercises:         14"));
}

#[test]
fn test_missing_store_starts_empty() {
    let temp_dir = setup_test_dir();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercises:         0"));

    cli(temp_dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No integrity problems"));

    // Read-only commands don't create the file
    assert!(!store_path(temp_dir.path()).exists());
}

#[test]
fn test_missing_import_file_fails() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("seed").assert().success();

    cli(temp_dir.path())
        .arg("import")
        .arg(temp_dir.path().join("does_not_exist.json"))
        .assert()
        .failure();

    cli(temp_dir.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exercises:         14"));
}

#[test]
fn test_check_repairs_orphans() {
    let temp_dir = setup_test_dir();
    cli(temp_dir.path()).arg("seed").assert().success();
    cli(temp_dir.path())
        .args(["log-set", "--exercise", "Barbell Row", "--weight", "70", "--reps", "8"])
        .assert()
        .success();

    // Simulate a partial write that lost the owning workout
    let path = store_path(temp_dir.path());
    let mut store: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    store["workouts"] = Value::Object(Default::default());
    fs::write(&path, serde_json::to_string(&store).unwrap()).unwrap();

    cli(temp_dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("has no owning workout"));

    cli(temp_dir.path())
        .args(["check", "--repair"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed 1 orphaned workout exercises"));

    cli(temp_dir.path())
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("No integrity problems"));

    let output = cli(temp_dir.path()).arg("stats").output().unwrap();
    let stats = String::from_utf8(output.stdout).unwrap();
    assert!(stats.contains("Workout exercises: 0"));
    assert!(stats.contains("Sets:              0"));
    // Records survive without their originating entry
    assert!(stats.contains("Personal records:  1"));
}
