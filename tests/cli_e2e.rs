//! End-to-end tests for the command-line surface.
//!
//! These exercise argument validation only; nothing here needs network
//! access or the external assembly tools installed.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn bookdl() -> (Command, TempDir) {
    let dir = TempDir::new().expect("temp working dir");
    let mut cmd = Command::cargo_bin("bookdl").expect("binary builds");
    // The run log is appended in the working directory; keep it out of the
    // source tree.
    cmd.current_dir(dir.path());
    (cmd, dir)
}

#[test]
fn test_no_arguments_fails() {
    let (mut cmd, _dir) = bookdl();
    cmd.assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_link_and_content_conflict() {
    let (mut cmd, _dir) = bookdl();
    cmd.args([
        "-l",
        "http://springerlink.com/content/abc123/",
        "-c",
        "abc123",
    ])
    .assert()
    .failure()
    .code(2);
}

#[test]
fn test_help_succeeds() {
    let (mut cmd, _dir) = bookdl();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-merge"))
        .stdout(predicate::str::contains("--concurrency"));
}

#[test]
fn test_version_succeeds() {
    let (mut cmd, _dir) = bookdl();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_unrecognized_link_fails_with_message() {
    let (mut cmd, _dir) = bookdl();
    cmd.args(["-l", "https://example.com/content/abc123/"])
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::contains("Bad link"));
}

#[test]
fn test_out_of_range_concurrency_rejected() {
    let (mut cmd, _dir) = bookdl();
    cmd.args(["-c", "abc123", "-j", "21"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_bad_link_is_logged() {
    let (mut cmd, dir) = bookdl();
    cmd.args(["-l", "https://example.com/content/abc123/"])
        .assert()
        .failure();

    let log = std::fs::read_to_string(dir.path().join("bookdl.log")).expect("run log written");
    assert!(log.starts_with("ERR: "), "log line: {log}");
    assert!(log.contains("Bad link"));
}
