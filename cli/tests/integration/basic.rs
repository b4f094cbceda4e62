//! Basic functionality integration tests for the keysync CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;

#[test]
fn test_prune_and_copy() {
    let fx = TestFixture::new();
    fx.src_file("alpha/a.txt", "alpha");
    fx.src_file("beta/nested/b.txt", "beta");
    fx.src_file("gamma/g.txt", "not listed");
    fx.dst_file("stale/old.txt", "old");
    fx.dst_file("notes.txt", "top-level file");
    let list = fx.key_list("alpha, beta # the two we want\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("--source")
        .arg(fx.src.path())
        .arg("--dest")
        .arg(fx.dst.path())
        .arg("--list")
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed directories: stale"));

    assert!(!fx.dst.path().join("stale").exists());
    assert!(!fx.dst.path().join("gamma").exists());
    fx.assert_file_content(&fx.dst.path().join("notes.txt"), "top-level file");
    fx.assert_file_content(&fx.dst.path().join("alpha/a.txt"), "alpha");
    fx.assert_file_content(&fx.dst.path().join("beta/nested/b.txt"), "beta");
}

#[test]
fn test_copy_merges_into_existing_key() {
    let fx = TestFixture::new();
    fx.src_file("app/config.toml", "new");
    fx.dst_file("app/config.toml", "old");
    fx.dst_file("app/local.env", "local only");
    let list = fx.key_list("app\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.args(["-s"])
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .assert()
        .success();

    fx.assert_file_content(&fx.dst.path().join("app/config.toml"), "new");
    fx.assert_file_content(&fx.dst.path().join("app/local.env"), "local only");
}

#[test]
fn test_repeated_runs_are_stable() {
    let fx = TestFixture::new();
    fx.src_file("pkg/a.txt", "a");
    fx.src_file("pkg/sub/b.txt", "b");
    let list = fx.key_list("pkg\n");

    for _ in 0..2 {
        let mut cmd = cargo_bin_cmd!("keysync");
        cmd.arg("-s")
            .arg(fx.src.path())
            .arg("-d")
            .arg(fx.dst.path())
            .arg("-l")
            .arg(&list)
            .assert()
            .success();
    }

    assert_eq!(
        fx.files_under(fx.dst.path()),
        vec!["pkg/a.txt".to_string(), "pkg/sub/b.txt".to_string()]
    );
}

#[test]
fn test_missing_key_source_is_not_an_error() {
    let fx = TestFixture::new();
    fx.src_file("present/file.txt", "here");
    let list = fx.key_list("present absent\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains("Missing source (skipped)"));

    assert!(fx.dst.path().join("present/file.txt").exists());
    assert!(!fx.dst.path().join("absent").exists());
}

#[test]
fn test_show_keys_prints_sorted_keys() {
    let fx = TestFixture::new();
    let list = fx.key_list("zeta, alpha\n# comment\nmid bad!token alpha\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("--show-keys")
        .arg("--list")
        .arg(&list)
        .assert()
        .success()
        .stdout("alpha\nmid\nzeta\n");
}

#[test]
fn test_json_output() {
    let fx = TestFixture::new();
    fx.src_file("keep/file.txt", "12345");
    fx.dst_dir("drop");
    let list = fx.key_list("keep\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    let output = cmd
        .arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .arg("--output")
        .arg("json")
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(payload["schema_version"], "1.0");
    assert_eq!(payload["mode"], "execute");
    assert_eq!(payload["keys"], serde_json::json!(["keep"]));
    assert_eq!(payload["removed"], serde_json::json!(["drop"]));
    assert_eq!(payload["copy"]["files_copied"], 1);
    assert_eq!(payload["copy"]["bytes_copied"], 5);
    assert_eq!(payload["failures"], serde_json::json!([]));
    assert_eq!(payload["planned"], serde_json::json!([]));
}
