//! Dry-run integration tests.
//!
//! A dry run must report the same removals and copies a real run performs
//! while leaving both trees untouched.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;

fn setup() -> (TestFixture, std::path::PathBuf) {
    let fx = TestFixture::new();
    fx.src_file("keep/a.txt", "a");
    fx.src_file("keep/sub/b.txt", "b");
    fx.dst_file("drop/old.txt", "old");
    fx.dst_dir("keep");
    let list = fx.key_list("keep\n");
    (fx, list)
}

#[test]
fn test_dry_run_changes_nothing() {
    let (fx, list) = setup();

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: no changes were made."))
        .stdout(predicate::str::contains("Would remove directories: drop"))
        .stdout(predicate::str::contains("Would copy 2 files"));

    assert_eq!(fx.files_under(fx.dst.path()), vec!["drop/old.txt".to_string()]);
}

#[test]
fn test_plan_alias() {
    let (fx, list) = setup();

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .arg("--plan")
        .assert()
        .success()
        .stdout(predicate::str::contains("remove "))
        .stdout(predicate::str::contains("copy   "));

    assert!(fx.dst.path().join("drop/old.txt").exists());
}

#[test]
fn test_dry_run_is_repeatable() {
    let (fx, list) = setup();

    let run = || {
        let mut cmd = cargo_bin_cmd!("keysync");
        cmd.arg("-s")
            .arg(fx.src.path())
            .arg("-d")
            .arg(fx.dst.path())
            .arg("-l")
            .arg(&list)
            .arg("-n")
            .assert()
            .success()
            .get_output()
            .stdout
            .clone()
    };

    assert_eq!(run(), run());
}

#[test]
fn test_dry_run_json_lists_planned_actions() {
    let (fx, list) = setup();

    let mut cmd = cargo_bin_cmd!("keysync");
    let output = cmd
        .arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .args(["--dry-run", "--output", "json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload["mode"], "plan");
    assert_eq!(payload["removed"], serde_json::json!(["drop"]));

    let planned = payload["planned"].as_array().unwrap();
    let kinds: Vec<&str> = planned
        .iter()
        .map(|a| a["action"].as_str().unwrap())
        .collect();
    assert_eq!(
        kinds,
        vec!["remove_dir", "copy_file", "create_dir", "copy_file"]
    );
    assert_eq!(payload["copy"]["files_copied"], 2);
    assert_eq!(payload["copy"]["bytes_copied"], 2);
}

#[test]
fn test_dry_run_messages_at_info_level() {
    let (fx, list) = setup();

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .args(["--dry-run", "-v"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .stderr(predicate::str::contains("[dry-run] Would remove directory:"))
        .stderr(predicate::str::contains("[dry-run] Would copy file"));
}
