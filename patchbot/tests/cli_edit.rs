//! CLI tests for `patchbot edit`, `read` and `call`.
//!
//! Spawns the binary against a temp workspace and verifies output, file
//! contents, and exit codes for accepted and rejected batches.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use patchbot::exit_codes;
use patchbot::test_support::TestWorkspace;

fn patchbot(workspace: &TestWorkspace, args: &[&str], stdin: &str) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_patchbot"))
        .arg("--workspace")
        .arg(workspace.path())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn patchbot");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(stdin.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("patchbot output")
}

#[test]
fn edit_applies_batch_and_prints_trail() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.write("notes.txt", "a\nb\nc\n").expect("seed");

    let out = patchbot(
        &ws,
        &["edit", "notes.txt"],
        r#"[{"address":1,"operation":"REPLACE","newContent":"B"},
            {"address":2,"operation":"APPEND","newContent":"d"}]"#,
    );

    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(ws.read("notes.txt").expect("read"), "a\nB\nc\nd\n");
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("@@ 1 @@\n- b\n+ B"));
    assert!(stdout.contains("@@ 2 @@\n  c\n+ d"));
}

#[test]
fn conflicting_batch_exits_with_conflict_and_keeps_file() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.write("one.txt", "a").expect("seed");

    let out = patchbot(
        &ws,
        &["edit", "one.txt"],
        r#"[{"address":0,"operation":"REMOVE"},
            {"address":0,"operation":"REPLACE","newContent":"z"}]"#,
    );

    assert_eq!(out.status.code(), Some(exit_codes::CONFLICT));
    assert_eq!(ws.read("one.txt").expect("read"), "a");
    assert!(String::from_utf8_lossy(&out.stderr).contains("already removed"));
}

#[test]
fn out_of_range_exits_with_rejected() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.write("one.txt", "a").expect("seed");

    let out = patchbot(
        &ws,
        &["edit", "one.txt"],
        r#"[{"address":5,"operation":"REMOVE"}]"#,
    );

    assert_eq!(out.status.code(), Some(exit_codes::REJECTED));
}

#[test]
fn read_prints_addressed_lines() {
    let ws = TestWorkspace::new().expect("workspace");
    ws.write("src/a.rs", "fn a() {}\nfn b() {}").expect("seed");

    let out = patchbot(&ws, &["read", "src/a.rs"], "");

    assert_eq!(out.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "0: fn a() {}\n1: fn b() {}\n"
    );
}

#[test]
fn call_prints_error_payload_for_escaping_path() {
    let ws = TestWorkspace::new().expect("workspace");

    let out = patchbot(
        &ws,
        &["call", "writeFile"],
        r#"{"path":"../outside.txt","content":"x"}"#,
    );

    assert_eq!(out.status.code(), Some(exit_codes::INVALID));
    let response: serde_json::Value =
        serde_json::from_slice(&out.stdout).expect("json response");
    assert!(
        response["error"]
            .as_str()
            .expect("error")
            .contains("outside the workspace")
    );
}
