//! End-to-end tests for the `hpt` binary.
//!
//! The binary is built with the offline engine, so every task is answered
//! with an empty answer and status 0. These tests pin down argument
//! handling, exit codes and the split between stdout (report) and stderr
//! (usage, errors, logs).

use std::io::Write;
use std::process::{Command, Output, Stdio};

const HPT_VARS: [&str; 4] = ["HPT_LOG", "HPT_LOG_FORMAT", "HPT_REPORT", "HPT_ECHO_TASK"];

// ── Helpers ───────────────────────────────────────────────────────────────────

fn hpt() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hpt"));
    for var in HPT_VARS {
        cmd.env_remove(var);
    }
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &[u8]) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    // The child may exit without reading, which breaks the pipe.
    let _ = child.stdin.take().unwrap().write_all(input);
    child.wait_with_output().unwrap()
}

fn config_file(contents: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".cfg").tempfile().unwrap();
    file.write_all(contents).unwrap();
    file
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).into_owned()
}

// ── Arguments ─────────────────────────────────────────────────────────────────

#[test]
fn option_like_argument_prints_usage() {
    let out = hpt().arg("-x").stdin(Stdio::null()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"));
    assert!(out.stdout.is_empty());
}

#[test]
fn double_dash_alone_is_not_an_end_of_options() {
    let mut cmd = hpt();
    cmd.arg("--");
    let out = run_with_stdin(cmd, b"FTST?\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"));
    assert!(out.stdout.is_empty());
}

#[test]
fn double_dash_before_a_file_prints_usage() {
    let file = config_file(b"FTST?\n");
    let out = hpt().arg("--").arg(file.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"));
    assert!(out.stdout.is_empty());
}

#[test]
fn two_arguments_print_usage() {
    let out = hpt().args(["a.cfg", "b.cfg"]).stdin(Stdio::null()).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("Usage"));
}

#[test]
fn missing_file_fails_before_any_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = hpt().arg(dir.path().join("absent.cfg")).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("absent.cfg"));
    assert!(out.stdout.is_empty());
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

#[test]
fn empty_stdin_succeeds_silently() {
    let out = hpt().stdin(Stdio::null()).output().unwrap();
    assert_eq!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
}

#[test]
fn file_argument_is_dispatched() {
    let file = config_file(b"hp93000,config,0.1\nFTST?\nPUT #9000000005ab\ncd\n");
    let out = hpt().arg(file.path()).output().unwrap();
    assert_eq!(out.status.code(), Some(0), "stderr: {}", stderr(&out));

    let report = stdout(&out);
    assert!(report.starts_with("Discarding hp93000,config,0.1\n"));
    assert!(report.contains("task: FTST?\n"));
    assert!(report.contains("binary length: 5\nextra bytes: 3\n"));
    assert_eq!(report.matches("status: 0 (ok)").count(), 2);
}

#[test]
fn stdin_is_read_when_no_file_is_given() {
    let out = run_with_stdin(hpt(), b"FTST?\n");
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("task length: 6\n"));
}

#[test]
fn malformed_frame_exits_with_failure() {
    let out = run_with_stdin(hpt(), b"FTST?\nPUT #9000000001abcd\nNEVER\n");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("line 2"));
    let report = stdout(&out);
    assert!(report.contains("task: FTST?\n"));
    assert!(!report.contains("NEVER"));
}

#[test]
fn truncated_segment_exits_with_failure() {
    let out = run_with_stdin(hpt(), b"PUT #9000000010ab\ncd");
    assert_eq!(out.status.code(), Some(1));
    assert!(stderr(&out).contains("truncated"));
}

// ── Environment ───────────────────────────────────────────────────────────────

#[test]
fn json_report_emits_one_object_per_line() {
    let mut cmd = hpt();
    cmd.env("HPT_REPORT", "json");
    let out = run_with_stdin(cmd, b"hp93000,config,0.1\nFTST?\n");
    assert_eq!(out.status.code(), Some(0));

    let entries: Vec<serde_json::Value> = stdout(&out)
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["event"], "discarded");
    assert_eq!(entries[1]["event"], "dispatched");
    assert_eq!(entries[1]["severity"], "ok");
}

#[test]
fn echo_can_be_disabled() {
    let mut cmd = hpt();
    cmd.env("HPT_ECHO_TASK", "0");
    let out = run_with_stdin(cmd, b"FTST?\n");
    assert_eq!(out.status.code(), Some(0));
    assert!(!stdout(&out).contains("task: "));
}

#[test]
fn unknown_report_format_is_a_usage_error() {
    let out = hpt()
        .env("HPT_REPORT", "xml")
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let err = stderr(&out);
    assert!(err.contains("HPT_REPORT"));
    assert!(err.contains("Usage"));
    assert!(out.stdout.is_empty());
}
