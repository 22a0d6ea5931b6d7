use md5ls::error::ExitCode;
use md5ls::manifest::{BuilderConfig, ManifestBuilder, SortKey};
use md5ls::scanner::WalkerConfig;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use super::support::run_isolated as run;

const MD5_HELLO: &str = "5d41402abc4b2a76b9719d911017c592";
const MD5_WORLD: &str = "7d793037a0760186574b0282f2f435e7";
const MD5_EMPTY: &str = "d41d8cd98f00b204e9800998ecf8427e";

fn sample_tree(root: &Path) {
    fs::write(root.join("a.txt"), "hello").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("b.txt"), "world").unwrap();
    fs::write(root.join("sub").join("c.txt"), "hello").unwrap();
}


#[test]
fn test_create_manifest_text() {
    let dir = tempdir().unwrap();
    sample_tree(dir.path());

    let (manifest, summary) = ManifestBuilder::with_defaults().build(dir.path()).unwrap();

    assert_eq!(summary.files_found, 3);
    assert_eq!(summary.files_hashed, 3);
    assert_eq!(summary.bytes_hashed, 15);
    assert_eq!(
        manifest.to_text(),
        format!("{MD5_HELLO}  ./a.txt\n{MD5_WORLD}  ./sub/b.txt\n{MD5_HELLO}  ./sub/c.txt\n")
    );
}

#[test]
fn test_create_sorted_by_hash() {
    let dir = tempdir().unwrap();
    sample_tree(dir.path());

    let config = BuilderConfig::default().with_sort_key(SortKey::Hash);
    let (manifest, _) = ManifestBuilder::new(config).build(dir.path()).unwrap();

    assert_eq!(
        manifest.to_text(),
        format!("{MD5_HELLO}  ./a.txt\n{MD5_HELLO}  ./sub/c.txt\n{MD5_WORLD}  ./sub/b.txt\n")
    );
}

#[test]
fn test_create_is_idempotent() {
    let dir = tempdir().unwrap();
    sample_tree(dir.path());

    let builder = ManifestBuilder::with_defaults();
    let (first, _) = builder.build(dir.path()).unwrap();
    let (second, _) = builder.build(dir.path()).unwrap();
    assert_eq!(first.to_text(), second.to_text());
}

#[test]
fn test_parallel_matches_sequential() {
    let dir = tempdir().unwrap();
    for i in 0..40 {
        let sub = dir.path().join(format!("d{}", i % 5));
        fs::create_dir_all(&sub).unwrap();
        fs::write(sub.join(format!("f{i}.bin")), format!("content {}", i % 7)).unwrap();
    }

    let (sequential, _) = ManifestBuilder::new(BuilderConfig::default().with_jobs(1))
        .build(dir.path())
        .unwrap();
    let (parallel, _) = ManifestBuilder::new(BuilderConfig::default().with_jobs(8))
        .build(dir.path())
        .unwrap();

    assert_eq!(sequential.len(), 40);
    assert_eq!(sequential.to_text(), parallel.to_text());
}

#[test]
fn test_empty_files_and_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("empty_dir/nested")).unwrap();
    fs::write(dir.path().join("zero.bin"), "").unwrap();

    let (manifest, _) = ManifestBuilder::with_defaults().build(dir.path()).unwrap();
    assert_eq!(manifest.to_text(), format!("{MD5_EMPTY}  ./zero.bin\n"));
}

#[test]
fn test_empty_root_yields_empty_manifest() {
    let dir = tempdir().unwrap();
    let (manifest, summary) = ManifestBuilder::with_defaults().build(dir.path()).unwrap();
    assert!(manifest.is_empty());
    assert_eq!(manifest.to_text(), "");
    assert!(!summary.is_partial());
}

#[test]
fn test_ignore_and_hidden_filters() {
    let dir = tempdir().unwrap();
    sample_tree(dir.path());
    fs::write(dir.path().join("scratch.tmp"), "x").unwrap();
    fs::write(dir.path().join(".hidden"), "x").unwrap();

    let walker = WalkerConfig::new(false, true, vec!["*.tmp".to_string()]);
    let config = BuilderConfig::default().with_walker_config(walker);
    let (manifest, _) = ManifestBuilder::new(config).build(dir.path()).unwrap();

    let paths: Vec<&str> = manifest.entries().iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, vec!["a.txt", "sub/b.txt", "sub/c.txt"]);
}

#[test]
fn test_run_app_create_writes_file() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    sample_tree(&root);
    let out = dir.path().join("tree.md5");

    let code = run(&[
        "create",
        "-r",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--no-progress",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    let (expected, _) = ManifestBuilder::with_defaults().build(&root).unwrap();
    assert_eq!(fs::read_to_string(&out).unwrap(), expected.to_text());
}

#[test]
fn test_run_app_create_k1_and_jobs() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    sample_tree(&root);
    let out = dir.path().join("tree.md5");

    run(&[
        "create",
        "-r",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "-j",
        "4",
        "-k",
        "--no-progress",
    ])
    .unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let first_two: Vec<&str> = text.lines().take(2).collect();
    assert!(first_two.iter().all(|l| l.starts_with(MD5_HELLO)));
}

#[test]
fn test_run_app_create_ignore_flag() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    sample_tree(&root);
    let out = dir.path().join("tree.md5");

    run(&[
        "create",
        "-r",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "-i",
        "sub/",
        "--no-progress",
    ])
    .unwrap();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        format!("{MD5_HELLO}  ./a.txt\n")
    );
}

#[test]
fn test_run_app_create_overwrites_existing_output() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("a.txt"), "hello").unwrap();
    let out = dir.path().join("tree.md5");
    fs::write(&out, "stale contents\n").unwrap();

    run(&[
        "create",
        "-r",
        root.to_str().unwrap(),
        "-o",
        out.to_str().unwrap(),
        "--no-progress",
    ])
    .unwrap();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        format!("{MD5_HELLO}  ./a.txt\n")
    );
}
