use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

fn setup_tree() -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    let root = dir.path().join("doomed");

    fs::create_dir_all(root.join("node_modules/left-pad")).unwrap();
    fs::write(root.join("node_modules/left-pad/index.js"), "module.exports = 1").unwrap();
    fs::create_dir_all(root.join("target/debug/deps")).unwrap();
    fs::write(root.join("target/debug/deps/libfoo.rlib"), "rlib").unwrap();
    fs::write(root.join("README.md"), "# doomed").unwrap();

    dir
}

#[test]
fn test_removes_tree() {
    let dir = setup_tree();
    let root = dir.path().join("doomed");

    Command::cargo_bin("parallel-rm-rf")
        .unwrap()
        .arg(&root)
        .arg("--quiet")
        .assert()
        .success();

    assert!(!root.exists());
    assert!(dir.path().exists());
}

#[test]
fn test_summary_output() {
    let dir = setup_tree();
    let root = dir.path().join("doomed");

    Command::cargo_bin("parallel-rm-rf")
        .unwrap()
        .arg(&root)
        .args(["-p", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removal Complete"))
        .stdout(predicate::str::contains("Files removed: 3"));
}

#[test]
fn test_verbose_prints_worker_lines() {
    let dir = setup_tree();
    let root = dir.path().join("doomed");

    Command::cargo_bin("parallel-rm-rf")
        .unwrap()
        .arg(&root)
        .args(["--processes", "3", "--verbose", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("constructed directory list"))
        .stdout(predicate::str::contains("worker 2 removed"))
        .stdout(predicate::str::contains("files per second"))
        .stdout(predicate::str::contains("directories per second"));
}

#[test]
fn test_zero_workers_rejected() {
    let dir = setup_tree();
    let root = dir.path().join("doomed");

    Command::cargo_bin("parallel-rm-rf")
        .unwrap()
        .arg(&root)
        .args(["-p", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid worker count 0"));

    assert!(root.join("README.md").exists());
}

#[test]
fn test_missing_directory_fails() {
    let dir = tempdir().unwrap();

    Command::cargo_bin("parallel-rm-rf")
        .unwrap()
        .arg(dir.path().join("nothing-here"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid root"));
}

#[test]
fn test_requires_path() {
    Command::cargo_bin("parallel-rm-rf")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("DIRPATH"));
}
