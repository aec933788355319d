//! Integration tests for the `credkit` binary.
//!
//! Each test builds fixture files in a temporary directory, invokes the
//! binary via `assert_cmd`, and checks outputs and exit codes. Where a
//! decode is needed, an in-process daemon stand-in answers on a
//! Unix-domain socket.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::thread;

use assert_cmd::Command;
use predicates::prelude::*;

/// Convenience: get a `Command` for the `credkit` binary.
fn credkit() -> Command {
    Command::cargo_bin("credkit").expect("credkit binary not found")
}

/// Spawns a one-shot daemon stand-in answering the first connection with
/// `response` (newline appended) and returns its endpoint.
fn spawn_daemon(dir: &tempfile::TempDir, response: &'static str) -> PathBuf {
    let endpoint = dir.path().join("authority.sock");
    let listener = UnixListener::bind(&endpoint).expect("bind endpoint");
    thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept");
        let mut reader = BufReader::new(stream.try_clone().expect("clone stream"));
        let mut line = String::new();
        reader.read_line(&mut line).expect("read request");
        let request: serde_json::Value =
            serde_json::from_str(&line).expect("request is JSON");
        assert!(request["credential"].is_string(), "request: {line}");
        let mut stream = stream;
        stream.write_all(response.as_bytes()).expect("write reply");
        stream.write_all(b"\n").expect("write newline");
    });
    endpoint
}

#[test]
fn list_attributes_prints_the_registry_in_order_and_exits_zero() {
    credkit()
        .arg("--list-attributes")
        .assert()
        .success()
        .stdout("STATUS-CODE\nSTATUS-TEXT\nUID\nGID\nLENGTH\n");
}

#[test]
fn successful_decode_prints_metadata_separator_and_payload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");
    // "aGVsbG8=" is base64 for "hello".
    let endpoint = spawn_daemon(
        &dir,
        r#"{"status":0,"payload":"aGVsbG8=","uid":1000,"gid":100}"#,
    );

    credkit()
        .arg("-S")
        .arg(&endpoint)
        .arg("-i")
        .arg(&cred)
        .assert()
        .success()
        .stdout(predicate::str::contains("STATUS-CODE:"))
        .stdout(predicate::str::contains("UID:"))
        .stdout(predicate::str::contains("1000"))
        .stdout(predicate::str::ends_with("\n\nhello"));
}

#[test]
fn classified_failure_sets_the_exit_code_and_renders_status_only() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");
    let endpoint = spawn_daemon(&dir, r#"{"status":6,"detail":"expired"}"#);

    credkit()
        .arg("-S")
        .arg(&endpoint)
        .arg("-i")
        .arg(&cred)
        .assert()
        .code(6)
        .stdout(predicate::str::contains("STATUS-CODE:"))
        .stdout(predicate::str::contains("Credential expired"))
        .stdout(predicate::str::contains("UID:").not());
}

#[test]
fn unreachable_authority_is_a_classified_failure_not_a_crash() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");

    credkit()
        .arg("-S")
        .arg(dir.path().join("absent.sock"))
        .arg("-i")
        .arg(&cred)
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Trust authority unavailable"));
}

#[test]
fn attribute_subset_limits_the_rendered_lines() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");
    let endpoint = spawn_daemon(&dir, r#"{"status":0,"payload":"","uid":7,"gid":8}"#);

    credkit()
        .arg("-S")
        .arg(&endpoint)
        .arg("-i")
        .arg(&cred)
        .arg("-t")
        .arg("uid,bogus-name")
        .arg("-o")
        .arg(dir.path().join("data.out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("UID:"))
        .stdout(predicate::str::contains("STATUS-CODE:").not())
        .stdout(predicate::str::contains("LENGTH:").not());
}

#[test]
fn no_output_mode_prints_nothing_but_keeps_the_exit_code() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");
    let endpoint = spawn_daemon(&dir, r#"{"status":8}"#);

    credkit()
        .arg("-S")
        .arg(&endpoint)
        .arg("-i")
        .arg(&cred)
        .arg("-n")
        .assert()
        .code(8)
        .stdout("");
}

#[test]
fn aliased_input_and_output_fail_before_touching_the_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");

    credkit()
        .arg("-i")
        .arg(&cred)
        .arg("-o")
        .arg(&cred)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("same file"));

    assert_eq!(std::fs::read(&cred).expect("input intact"), b"blob");
}

#[test]
fn metadata_goes_to_a_file_while_payload_stays_on_stdout() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cred = dir.path().join("cred.in");
    std::fs::write(&cred, b"blob").expect("write credential");
    let meta = dir.path().join("meta.out");
    let endpoint = spawn_daemon(
        &dir,
        r#"{"status":0,"payload":"cGF5bG9hZA==","uid":1,"gid":2}"#,
    );

    credkit()
        .arg("-S")
        .arg(&endpoint)
        .arg("-i")
        .arg(&cred)
        .arg("-m")
        .arg(&meta)
        .assert()
        .success()
        // Payload only on stdout: no metadata, no separator line.
        .stdout("payload");

    let metadata = std::fs::read_to_string(&meta).expect("metadata file");
    assert_eq!(metadata.lines().count(), 5);
}
