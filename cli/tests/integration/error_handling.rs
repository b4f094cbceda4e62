//! Error handling and exit code tests.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::TestFixture;
use predicates::prelude::*;

#[test]
fn test_missing_key_list() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(fx.lists.path().join("does-not-exist.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[key_list_unreadable]"));
}

#[test]
fn test_empty_key_list_aborts_before_touching_dest() {
    let fx = TestFixture::new();
    fx.dst_dir("untouched");
    let list = fx.key_list("# only comments\n\n  , ,\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("error[no_keys]"));

    assert!(fx.dst.path().join("untouched").is_dir());
}

#[test]
fn test_only_invalid_tokens_counts_as_no_keys() {
    let fx = TestFixture::new();
    let list = fx.key_list("bad!name wh@t\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .assert()
        .code(2);
}

#[test]
fn test_invalid_exclude_pattern() {
    let fx = TestFixture::new();
    fx.dst_dir("untouched");
    let list = fx.key_list("keep\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .args(["-e", "[bad"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[invalid_pattern]"));

    assert!(fx.dst.path().join("untouched").is_dir());
}

#[test]
fn test_missing_dest_argument() {
    let fx = TestFixture::new();
    let list = fx.key_list("keep\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-l")
        .arg(&list)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[invalid_input]"))
        .stderr(predicate::str::contains("--dest"));
}

#[test]
fn test_missing_source_checked_before_key_list() {
    let fx = TestFixture::new();

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(fx.lists.path().join("does-not-exist.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[invalid_input]"))
        .stderr(predicate::str::contains("--source"));
}

#[test]
fn test_show_keys_needs_no_roots() {
    let fx = TestFixture::new();
    let list = fx.key_list("solo\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("--show-keys")
        .arg("-l")
        .arg(&list)
        .assert()
        .success()
        .stdout("solo\n");
}

#[test]
fn test_missing_dest_root_is_reported_not_fatal() {
    let fx = TestFixture::new();
    fx.src_file("keep/file.txt", "content");
    let list = fx.key_list("keep\n");
    let dest = fx.dst.path().join("fresh");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(&dest)
        .arg("-l")
        .arg(&list)
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed directories: <none>"));

    fx.assert_file_content(&dest.join("keep/file.txt"), "content");
}

#[cfg(unix)]
#[test]
fn test_partial_failure_exit_code() {
    use std::os::unix::fs::PermissionsExt;

    let fx = TestFixture::new();
    fx.src_file("keep/ok.txt", "ok");
    let locked = fx.src_file("keep/locked.txt", "secret");
    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();
    // Root ignores permission bits
    if std::fs::read(&locked).is_ok() {
        return;
    }
    let list = fx.key_list("keep\n");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path())
        .arg("-d")
        .arg(fx.dst.path())
        .arg("-l")
        .arg(&list)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("warning: failed to copy"));

    std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o644)).unwrap();
    fx.assert_file_content(&fx.dst.path().join("keep/ok.txt"), "ok");
}

#[test]
fn test_key_outside_roots_is_a_partial_failure() {
    let fx = TestFixture::new();
    fx.src_file("esc/f.txt", "escaped");
    fx.src_file("inner/fine/f.txt", "fine");
    let list = fx.key_list("../esc fine\n");
    let dest = fx.dst.path().join("inner");

    let mut cmd = cargo_bin_cmd!("keysync");
    cmd.arg("-s")
        .arg(fx.src.path().join("inner"))
        .arg("-d")
        .arg(&dest)
        .arg("-l")
        .arg(&list)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("warning: failed to key ../esc"));

    assert!(!fx.dst.path().join("esc").exists());
    fx.assert_file_content(&dest.join("fine/f.txt"), "fine");
}
