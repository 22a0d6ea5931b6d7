use md5ls::diff::{diff_manifests, MovedCount, Side};
use md5ls::error::ExitCode;
use md5ls::manifest::parse_manifest;
use md5ls::load_manifest;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use super::support::run_isolated;

const H1: &str = "11111111111111111111111111111111";
const H2: &str = "22222222222222222222222222222222";

fn write_manifest(dir: &Path, name: &str, lines: &[(&str, &str)]) -> PathBuf {
    let text: String = lines.iter().map(|(h, p)| format!("{h}  ./{p}\n")).collect();
    let path = dir.join(name);
    fs::write(&path, text).unwrap();
    path
}

/// Run `diff` between two manifests and return the report text.
fn diff_report(dir: &TempDir, left: &Path, right: &Path, extra: &[&str]) -> String {
    let out = dir.path().join("report.txt");
    let mut args = vec![
        "diff",
        left.to_str().unwrap(),
        right.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);

    let code = run_isolated(&args).unwrap();
    assert_eq!(code, ExitCode::Success);
    fs::read_to_string(out).unwrap()
}

#[test]
fn test_identical_manifests_report_nothing() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "x.txt")]);
    let b = write_manifest(dir.path(), "b.md5", &[(H1, "x.txt")]);

    assert_eq!(diff_report(&dir, &a, &b, &[]), "");
    assert_eq!(
        diff_report(&dir, &a, &b, &["--summary"]),
        "0 files found only in the left manifest, a.md5\n\
         0 files found only in the right manifest, b.md5\n\
         0 files which have the same hash, but have been moved to a different path\n"
    );
}

#[test]
fn test_left_only_file() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "x.txt"), (H2, "gone.txt")]);
    let b = write_manifest(dir.path(), "b.md5", &[(H1, "x.txt")]);

    assert_eq!(
        diff_report(&dir, &a, &b, &[]),
        format!(
            "1 files found only in the left manifest, a.md5\n\
             < {H2}  gone.txt\n\
             \n"
        )
    );
}

#[test]
fn test_right_only_file() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[]);
    let b = write_manifest(dir.path(), "b.md5", &[(H2, "new.txt")]);

    assert_eq!(
        diff_report(&dir, &a, &b, &[]),
        format!(
            "1 files found only in the right manifest, b.md5\n\
             > {H2}  new.txt\n\
             \n"
        )
    );
}

#[test]
fn test_moved_file_counts_once() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "old/f.txt")]);
    let b = write_manifest(dir.path(), "b.md5", &[(H1, "new/f.txt")]);

    assert_eq!(
        diff_report(&dir, &a, &b, &[]),
        format!(
            "1 files which have the same hash, but have been moved to a different path\n\
             < {H1}  old/f.txt\n\
             > {H1}  new/f.txt\n\
             \n"
        )
    );
}

#[test]
fn test_duplicate_content_reports_unpaired_counts() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "a"), (H1, "b")]);
    let b = write_manifest(dir.path(), "b.md5", &[(H1, "a")]);

    let left = load_manifest(&a).unwrap();
    let right = load_manifest(&b).unwrap();
    let result = diff_manifests(&left, &right).unwrap();
    assert!(result.unique_left.is_empty());
    assert!(result.unique_right.is_empty());
    assert_eq!(result.moved.len(), 1);
    assert_eq!(result.moved[0].side, Side::Left);
    assert_eq!(result.moved[0].path.as_str(), "b");
    assert_eq!(
        result.summary().moved_files(),
        MovedCount::Unpaired { left: 1, right: 0 }
    );

    let report = diff_report(&dir, &a, &b, &["-s"]);
    assert!(report.ends_with(
        "1 left-side and 0 right-side paths which have the same hash, but differ in path\n"
    ));
}

#[test]
fn test_duplicate_lost_on_one_hash_and_gained_on_another_is_unpaired() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "a"), (H1, "b"), (H2, "c")]);
    let b = write_manifest(dir.path(), "b.md5", &[(H1, "a"), (H2, "c"), (H2, "d")]);

    let left = load_manifest(&a).unwrap();
    let right = load_manifest(&b).unwrap();
    let result = diff_manifests(&left, &right).unwrap();
    assert_eq!(
        result.summary().moved_files(),
        MovedCount::Unpaired { left: 1, right: 1 }
    );

    let report = diff_report(&dir, &a, &b, &["-s"]);
    assert!(report.ends_with(
        "1 left-side and 1 right-side paths which have the same hash, but differ in path\n"
    ));
}

#[test]
fn test_section_order_is_left_right_moved() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "moved_from"), (H2, "left_only")]);
    let b = write_manifest(
        dir.path(),
        "b.md5",
        &[(H1, "moved_to"), ("33333333333333333333333333333333", "right_only")],
    );

    let report = diff_report(&dir, &a, &b, &[]);
    let headings: Vec<&str> = report
        .lines()
        .filter(|l| l.chars().next().is_some_and(|c| c.is_ascii_digit()))
        .collect();
    assert_eq!(headings.len(), 3);
    assert!(headings[0].contains("only in the left manifest"));
    assert!(headings[1].contains("only in the right manifest"));
    assert!(headings[2].contains("moved"));
}

#[test]
fn test_json_report() {
    let dir = tempdir().unwrap();
    let a = write_manifest(dir.path(), "a.md5", &[(H1, "old/f.txt")]);
    let b = write_manifest(dir.path(), "b.md5", &[(H1, "new/f.txt")]);

    let report = diff_report(&dir, &a, &b, &["--format", "json"]);
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    assert_eq!(value["left"], "a.md5");
    assert_eq!(value["right"], "b.md5");
    assert_eq!(value["summary"]["moved"]["paired"], 1);
    assert_eq!(value["moved"].as_array().unwrap().len(), 2);
    assert_eq!(value["moved"][1]["side"], "right");
}

#[test]
fn test_crlf_manifest_matches_lf_manifest() {
    let dir = tempdir().unwrap();
    let lf = dir.path().join("lf.md5");
    let crlf = dir.path().join("crlf.md5");
    fs::write(&lf, format!("{H1}  ./a\n{H2}  ./b\n")).unwrap();
    fs::write(&crlf, format!("{H1}  ./a\r\n{H2}  ./b\r\n")).unwrap();

    assert_eq!(diff_report(&dir, &lf, &crlf, &[]), "");
}

#[test]
fn test_create_then_diff_round_trip() {
    let dir = tempdir().unwrap();
    let before = dir.path().join("before");
    let after = dir.path().join("after");
    for root in [&before, &after] {
        fs::create_dir_all(root.join("docs")).unwrap();
        fs::write(root.join("same.txt"), "unchanged").unwrap();
    }
    fs::write(before.join("docs/report.txt"), "quarterly").unwrap();
    fs::write(after.join("report.txt"), "quarterly").unwrap();
    fs::write(before.join("deleted.txt"), "bye").unwrap();
    fs::write(after.join("added.txt"), "hi").unwrap();

    let before_md5 = dir.path().join("before.md5");
    let after_md5 = dir.path().join("after.md5");
    for (root, out) in [(&before, &before_md5), (&after, &after_md5)] {
        run_isolated(&[
            "create",
            "-r",
            root.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--no-progress",
        ])
        .unwrap();
    }

    let left = parse_manifest(&fs::read_to_string(&before_md5).unwrap()).unwrap();
    let right = parse_manifest(&fs::read_to_string(&after_md5).unwrap()).unwrap();
    let result = diff_manifests(&left, &right).unwrap();

    let paths = |records: &[md5ls::diff::ChangeRecord]| -> Vec<String> {
        records.iter().map(|r| r.path.to_string()).collect()
    };
    assert_eq!(paths(&result.unique_left), vec!["deleted.txt"]);
    assert_eq!(paths(&result.unique_right), vec!["added.txt"]);
    assert_eq!(paths(&result.moved), vec!["docs/report.txt", "report.txt"]);
    assert_eq!(result.summary().moved_files(), MovedCount::Paired(1));
}
