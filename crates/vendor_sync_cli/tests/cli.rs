//! End-to-end tests for the `vendor-sync` binary.

use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn vendor_sync_cmd() -> Command {
    Command::cargo_bin("vendor-sync").expect("vendor-sync binary")
}

/// `source/mylib` with code, config, docs and a bytecode cache.
fn make_source_fixture() -> assert_fs::TempDir {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("source/mylib/__init__.py")
        .write_str("__version__ = \"1.0.0\"\n")
        .expect("init");
    tmp.child("source/mylib/core/engine.py")
        .write_str("def run():\n    return 1\n")
        .expect("engine");
    tmp.child("source/mylib/settings.json")
        .write_str("{\"debug\": false}\n")
        .expect("json");
    tmp.child("source/mylib/README.md")
        .write_str("# mylib\n")
        .expect("readme");
    tmp.child("source/mylib/__pycache__/engine.cpython-312.pyc")
        .write_binary(&[0x42, 0x0d, 0x0d, 0x0a])
        .expect("pyc");
    tmp.child("target").create_dir_all().expect("target");
    tmp
}

#[test]
fn sync_prints_summary_and_copies_filtered_files() {
    let tmp = make_source_fixture();

    vendor_sync_cmd()
        .arg("--source-path")
        .arg(tmp.child("source").path())
        .arg("--target-path")
        .arg(tmp.child("target").path())
        .args(["--package", "mylib"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: SUCCESS"))
        .stdout(predicate::str::contains("Files removed: 0"))
        .stdout(predicate::str::contains("Files copied: 3"))
        .stdout(predicate::str::contains("Directories created: 2"));

    let vendor = tmp.child("target/_vendor/mylib");
    vendor.child("__init__.py").assert(predicate::path::is_file());
    vendor.child("core/engine.py").assert(predicate::path::is_file());
    vendor.child("settings.json").assert(predicate::path::is_file());
    vendor.child("README.md").assert(predicate::path::missing());
    vendor.child("__pycache__").assert(predicate::path::missing());
}

#[test]
fn resync_reports_removed_files_and_custom_extensions() {
    let tmp = make_source_fixture();
    let run = |extensions: &str| {
        let mut cmd = vendor_sync_cmd();
        cmd.arg("--source-path")
            .arg(tmp.child("source").path())
            .arg("--target-path")
            .arg(tmp.child("target").path())
            .args(["--package", "mylib", "--vendor", "third_party", "-e", extensions]);
        cmd
    };

    run("py").assert().success();
    run("py;md")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files removed: 2"))
        .stdout(predicate::str::contains("Files copied: 3"));
    tmp.child("target/third_party/mylib/README.md")
        .assert(predicate::path::is_file());
}

#[test]
fn missing_source_is_validation_error() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("target").create_dir_all().expect("target");

    vendor_sync_cmd()
        .arg("--source-path")
        .arg(tmp.child("nope").path())
        .arg("--target-path")
        .arg(tmp.child("target").path())
        .args(["--package", "mylib"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains(
            "SyncVendorValueError (path-not-found): source_path does not exist",
        ));
}

#[test]
fn blank_package_is_validation_error() {
    let tmp = make_source_fixture();

    vendor_sync_cmd()
        .arg("--source-path")
        .arg(tmp.child("source").path())
        .arg("--target-path")
        .arg(tmp.child("target").path())
        .args(["--package", " "])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("(invalid-package)"));
}

#[test]
fn missing_required_argument_exits_with_usage_error() {
    vendor_sync_cmd()
        .args(["--target-path", "somewhere", "--package", "mylib"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--source-path"));
}

#[test]
fn scan_lists_versions_flat_and_nested() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("_vendor/library_a/__init__.py")
        .write_str("__version__ = '1.0.0'\n")
        .expect("library_a");
    tmp.child("_vendor/library_a/_vendor/library_b/__init__.py")
        .write_str("__version__ = '2.0.0'\n")
        .expect("library_b");
    tmp.child("_vendor/plain/__init__.py")
        .write_str("# no version\n")
        .expect("plain");

    vendor_sync_cmd()
        .arg("--target-path")
        .arg(tmp.path())
        .arg("--scan-versions")
        .assert()
        .success()
        .stdout("library_a 1.0.0\nplain ?\n");

    vendor_sync_cmd()
        .arg("--target-path")
        .arg(tmp.path())
        .args(["--scan-versions", "--nested"])
        .assert()
        .success()
        .stdout("library_a 1.0.0\n  library_b 2.0.0\nplain ?\n");
}

#[test]
fn scan_without_vendor_dir_fails() {
    let tmp = assert_fs::TempDir::new().expect("tempdir");

    vendor_sync_cmd()
        .arg("--target-path")
        .arg(tmp.path())
        .arg("--scan-versions")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Vendor directory does not exist"));
}
