//! Exit status and stream behavior of the compiled binary.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

const H1: &str = "0123456789abcdef0123456789abcdef";

fn md5ls(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_md5ls"))
        .args(args)
        // Keep the user's config file and environment out of the run
        .arg("--config")
        .arg(config_dir.join("absent.toml"))
        .env_remove("RUST_LOG")
        .env_remove("MD5LS_JOBS")
        .env_remove("MD5LS_SORT_KEY")
        .env_remove("MD5LS_FORMAT")
        .env_remove("MD5LS_SUMMARY")
        .output()
        .unwrap()
}

#[test]
fn test_create_to_stdout() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();

    let output = md5ls(
        dir.path(),
        &["-q", "create", "-r", root.to_str().unwrap(), "--no-progress"],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "5d41402abc4b2a76b9719d911017c592  ./a.txt\n"
    );
}

#[test]
fn test_huge_chunk_size_is_capped_not_fatal() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();

    let output = md5ls(
        dir.path(),
        &[
            "create",
            "-r",
            root.to_str().unwrap(),
            "--no-progress",
            "--chunk-size",
            "100000GiB",
        ],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "5d41402abc4b2a76b9719d911017c592  ./a.txt\n"
    );
    assert!(String::from_utf8_lossy(&output.stderr).contains("maximum, capping"));
}

#[test]
fn test_diff_to_stdout() {
    let dir = tempdir().unwrap();
    let left = dir.path().join("l.md5");
    let right = dir.path().join("r.md5");
    fs::write(&left, format!("{H1}  ./a\n")).unwrap();
    fs::write(&right, "").unwrap();

    let output = md5ls(
        dir.path(),
        &["-q", "diff", left.to_str().unwrap(), right.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        format!("1 files found only in the left manifest, l.md5\n< {H1}  a\n\n")
    );
}

#[test]
fn test_malformed_manifest_exit_code_and_no_output() {
    let dir = tempdir().unwrap();
    let left = dir.path().join("l.md5");
    let right = dir.path().join("r.md5");
    let out = dir.path().join("report.txt");
    fs::write(&left, "too short\n").unwrap();
    fs::write(&right, format!("{H1}  ./a\n")).unwrap();

    let output = md5ls(
        dir.path(),
        &[
            "diff",
            left.to_str().unwrap(),
            right.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[ML002]"), "stderr: {stderr}");
    assert!(stderr.contains("Malformed manifest line 1"), "stderr: {stderr}");
}

#[test]
fn test_missing_root_exit_code() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.md5");

    let output = md5ls(
        dir.path(),
        &[
            "create",
            "-r",
            dir.path().join("nope").to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(!out.exists());
}

#[test]
fn test_missing_manifest_is_general_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.md5");

    let output = md5ls(
        dir.path(),
        &["diff", missing.to_str().unwrap(), missing.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_errors() {
    let dir = tempdir().unwrap();
    let left = dir.path().join("l.md5");
    fs::write(&left, "x\n").unwrap();

    let output = md5ls(
        dir.path(),
        &[
            "-q",
            "--json-errors",
            "diff",
            left.to_str().unwrap(),
            left.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json_start = stderr.find('{').unwrap();
    let value: serde_json::Value = serde_json::from_str(stderr[json_start..].trim()).unwrap();
    assert_eq!(value["code"], "ML002");
    assert_eq!(value["exit_code"], 2);
}

#[test]
fn test_usage_error_exit_code() {
    let dir = tempdir().unwrap();
    let output = md5ls(dir.path(), &["create", "-j", "0"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_help_exits_zero() {
    let output = Command::new(env!("CARGO_BIN_EXE_md5ls"))
        .arg("--help")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("create"));
}
