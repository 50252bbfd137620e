//! Basic functionality integration tests for spcp CLI.

#[path = "../common/mod.rs"]
mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{TestFixture, count_files_recursive};
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_copy_single_root() {
    let fx = TestFixture::new();
    fx.write("doc.txt", "0123456789");
    fx.write("sub/nested/deep.txt", "deep");

    fx.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 2 files"));

    fx.assert_file_content(&fx.vol.path().join("doc.txt"), "0123456789");
    fx.assert_file_content(&fx.vol.path().join("sub/nested/deep.txt"), "deep");
}

#[test]
fn test_copy_multiple_roots_merge() {
    let fx = TestFixture::new();
    let a = fx.src.path().join("A");
    let b = fx.src.path().join("B");
    fs::create_dir_all(a.join("docs")).unwrap();
    fs::create_dir_all(b.join("photos")).unwrap();
    fs::write(a.join("docs/report.txt"), "report").unwrap();
    fs::write(b.join("photos/cat.jpg"), "meow").unwrap();

    fx.bare_command()
        .arg(&a)
        .arg(&b)
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .success();

    fx.assert_file_content(&fx.vol.path().join("docs/report.txt"), "report");
    fx.assert_file_content(&fx.vol.path().join("photos/cat.jpg"), "meow");
    assert_eq!(count_files_recursive(fx.vol.path()), 2);
}

#[test]
fn test_missing_root_warns_and_continues() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");
    let missing = fx.work.path().join("not-here");

    fx.bare_command()
        .arg(&missing)
        .arg(fx.src.path())
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("does not exist"));

    assert!(fx.vol.path().join("file.txt").is_file());
}

#[test]
fn test_no_source_files_fails() {
    let fx = TestFixture::new();

    fx.command()
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[no_source_files]"));

    // The log was opened before the check and holds only its header
    assert!(fx.log_rows().is_empty());
    assert_eq!(count_files_recursive(fx.vol.path()), 0);
}

#[test]
fn test_chunk_size_option() {
    let fx = TestFixture::new();
    let data: Vec<u8> = (0..50_000u32).map(|i| (i % 253) as u8).collect();
    fx.write("data.bin", &data);

    fx.command()
        .arg("--chunk-size")
        .arg("1K")
        .assert()
        .success();

    assert_eq!(fs::read(fx.vol.path().join("data.bin")).unwrap(), data);
}

#[test]
fn test_invalid_size_is_usage_error() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");

    fx.command()
        .arg("--buffer")
        .arg("10X")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown unit"));

    fx.command().arg("--chunk-size").arg("0").assert().code(2);
}

#[test]
fn test_sources_required() {
    cargo_bin_cmd!("spcp").assert().code(2);
}

#[test]
fn test_verbose_summary() {
    let fx = TestFixture::new();
    fx.create_files(3, 100);

    fx.command()
        .arg("-v")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files copied:   3"))
        .stdout(predicate::str::contains(
            fx.vol.path().display().to_string(),
        ));
}

#[test]
fn test_default_log_in_working_directory() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");
    let cwd = TempDir::new().unwrap();

    cargo_bin_cmd!("spcp")
        .current_dir(cwd.path())
        .arg(fx.src.path())
        .arg("--volume")
        .arg(fx.vol.path())
        .arg("--buffer")
        .arg("0")
        .arg("-q")
        .assert()
        .success();

    assert!(cwd.path().join("CopyLog.csv").is_file());
}
