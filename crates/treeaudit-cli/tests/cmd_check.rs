//! Integration tests for `treeaudit check`.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

/// Path to the compiled `treeaudit` binary.
fn treeaudit_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    // current_exe is something like …/deps/cmd_check-<hash>
    // The binary lives in the parent directory.
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("treeaudit");
    path
}

/// Path to a file in the workspace `demos/` directory.
fn demo(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../demos");
    path.push(name);
    path
}

fn temp_json(contents: &str) -> tempfile::NamedTempFile {
    let mut f = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("create temp file");
    f.write_all(contents.as_bytes()).expect("write temp file");
    f
}

fn check(args: &[&str]) -> Output {
    Command::new(treeaudit_bin())
        .arg("check")
        .args(args)
        .env_remove("TREEAUDIT_LOG")
        .env_remove("RUST_LOG")
        .output()
        .expect("run treeaudit check")
}

fn demo_args() -> Vec<String> {
    vec![
        "--catalog".to_owned(),
        demo("catalog.json").display().to_string(),
        "--snapshot".to_owned(),
        demo("snapshot.json").display().to_string(),
    ]
}

fn stdout(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).into_owned()
}

const TREE_CATALOG: &str = r#"{"rules": [
    {"name": "complete", "kind": "missing_levels", "dataset": "tree"}
]}"#;

const CLEAN_TREE: &str = r#"{"tree": [
    {"path": "/", "owner": 1},
    {"path": "/1/", "owner": 1},
    {"path": "/1/1/", "owner": 1}
]}"#;

// ---------------------------------------------------------------------------
// reference catalogue
// ---------------------------------------------------------------------------

#[test]
fn reference_catalogue_exits_1() {
    let args = demo_args();
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = check(&refs);
    assert_eq!(
        out.status.code(),
        Some(1),
        "reference data carries three known faults; stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn reference_catalogue_human_report() {
    let args = demo_args();
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let text = stdout(&check(&refs));
    assert!(text.contains("[PASS] unit_code_uppercase"), "stdout: {text}");
    assert!(
        text.contains("[FAIL] address_duplicates  expected 0, actual 3"),
        "stdout: {text}"
    );
    assert!(
        text.contains("[FAIL] document_mixed_owners  expected 0, actual 2"),
        "stdout: {text}"
    );
    assert!(
        text.contains("7 rules: 4 passed, 3 failed, 0 errored"),
        "stdout: {text}"
    );
    assert!(!text.contains('\x1b'), "piped output has no ANSI codes");
}

#[test]
fn reference_catalogue_json_report() {
    let mut args = demo_args();
    args.extend(["--format".to_owned(), "json".to_owned()]);
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let text = stdout(&check(&refs));

    let lines: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).expect("every stdout line is JSON"))
        .collect();
    assert_eq!(lines.len(), 8, "seven results and a summary");
    assert_eq!(lines[6]["rule"], "document_owner_collisions");
    assert_eq!(lines[6]["actual"], 1);
    assert_eq!(lines[7]["summary"]["passed"], 4);
}

#[test]
fn quiet_prints_only_failures_and_the_error() {
    let mut args = demo_args();
    args.push("--quiet".to_owned());
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let out = check(&refs);
    let text = stdout(&out);
    assert!(!text.contains("[PASS]"), "stdout: {text}");
    assert_eq!(text.matches("[FAIL]").count(), 3, "stdout: {text}");
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("3 rule(s) failed"),
        "quiet mode still explains the exit code"
    );
}

#[test]
fn parallel_run_reports_the_same_lines() {
    let args = demo_args();
    let refs: Vec<&str> = args.iter().map(String::as_str).collect();
    let sequential = stdout(&check(&refs));

    let mut par_args = demo_args();
    par_args.push("--parallel".to_owned());
    let par_refs: Vec<&str> = par_args.iter().map(String::as_str).collect();
    assert_eq!(stdout(&check(&par_refs)), sequential);
}

// ---------------------------------------------------------------------------
// clean inputs
// ---------------------------------------------------------------------------

#[test]
fn clean_snapshot_exits_0() {
    let catalog = temp_json(TREE_CATALOG);
    let snapshot = temp_json(CLEAN_TREE);
    let out = check(&[
        "-c",
        catalog.path().to_str().expect("path"),
        "-s",
        snapshot.path().to_str().expect("path"),
    ]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn snapshot_from_stdin() {
    let catalog = temp_json(TREE_CATALOG);
    let mut child = Command::new(treeaudit_bin())
        .args([
            "check",
            "-c",
            catalog.path().to_str().expect("path"),
            "-s",
            "-",
        ])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn treeaudit");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(CLEAN_TREE.as_bytes())
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(0));
    assert!(stdout(&out).contains("[PASS] complete"));
}

// ---------------------------------------------------------------------------
// input failures (exit 2)
// ---------------------------------------------------------------------------

#[test]
fn both_inputs_from_stdin_is_rejected() {
    let out = check(&["-c", "-", "-s", "-"]);
    assert_eq!(out.status.code(), Some(2));
}

#[test]
fn missing_catalogue_file_exits_2() {
    let snapshot = temp_json(CLEAN_TREE);
    let out = check(&[
        "-c",
        "/no/such/catalog.json",
        "-s",
        snapshot.path().to_str().expect("path"),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("file not found"));
}

#[test]
fn malformed_snapshot_exits_2_with_position() {
    let catalog = temp_json(TREE_CATALOG);
    let snapshot = temp_json("{\n  \"tree\": [ oops ]\n}");
    let out = check(&[
        "-c",
        catalog.path().to_str().expect("path"),
        "-s",
        snapshot.path().to_str().expect("path"),
    ]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("line 2"), "stderr: {stderr}");
}

#[test]
fn dataset_absent_from_snapshot_exits_2() {
    let catalog = temp_json(TREE_CATALOG);
    let snapshot = temp_json(r#"{"other": []}"#);
    let out = check(&[
        "-c",
        catalog.path().to_str().expect("path"),
        "-s",
        snapshot.path().to_str().expect("path"),
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(out.stdout.is_empty(), "no partial report");
    assert!(String::from_utf8_lossy(&out.stderr).contains("\"tree\""));
}

#[test]
fn oversized_input_exits_2() {
    let catalog = temp_json(TREE_CATALOG);
    let snapshot = temp_json(CLEAN_TREE);
    let out = check(&[
        "-c",
        catalog.path().to_str().expect("path"),
        "-s",
        snapshot.path().to_str().expect("path"),
        "--max-file-size",
        "16",
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("too large"));
}
