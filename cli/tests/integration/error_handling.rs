//! Error handling integration tests for spcp CLI.
//!
//! Run-level problems (nothing to copy, no volume, unusable log) stop the
//! run with exit code 1. Per-file problems are recorded as `Failed` and the
//! run carries on with exit code 0.

#[path = "../common/mod.rs"]
mod common;

use common::{TestFixture, count_files_recursive, has_root_privileges};
use predicates::prelude::*;
use std::fs;

#[test]
fn test_no_volume_available() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");

    fx.bare_command()
        .arg(fx.src.path())
        .arg("--volume")
        .arg(fx.work.path().join("not-mounted"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[no_volume_available]"));
}

#[test]
fn test_invalid_volume_skipped() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");

    fx.bare_command()
        .arg(fx.src.path())
        .arg("--volume")
        .arg(fx.work.path().join("not-mounted"))
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .success()
        .stderr(predicate::str::contains("not an accessible directory"));

    fx.assert_file_content(&fx.vol.path().join("file.txt"), "content");
}

#[test]
fn test_max_attempts_limits_volume_candidates() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");

    fx.bare_command()
        .arg(fx.src.path())
        .arg("--max-attempts")
        .arg("1")
        .arg("--volume")
        .arg(fx.work.path().join("not-mounted"))
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("after 1 attempt(s)"));

    assert!(!fx.vol.path().join("file.txt").exists());
}

#[test]
fn test_prompt_without_terminal_fails() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");

    // No --volume and no terminal to ask on
    fx.bare_command()
        .arg(fx.src.path())
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[no_volume_available]"));
}

#[test]
fn test_log_sink_failure_is_fatal() {
    let fx = TestFixture::new();
    fx.write("file.txt", "content");

    fx.command()
        .arg("--log")
        .arg(fx.work.path().join("missing/dir/log.csv"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error[log_sink]"));

    assert_eq!(count_files_recursive(fx.vol.path()), 0);
}

#[test]
fn test_blocked_directory_fails_file_and_continues() {
    let fx = TestFixture::new();
    fx.write("docs/a.txt", "a");
    fx.write("z.txt", "z");
    fs::write(fx.vol.path().join("docs"), "a file where a directory should be").unwrap();

    fx.command()
        .assert()
        .success()
        .stdout(predicate::str::contains("1 file(s) failed"));

    assert_eq!(fx.count_status("Failed"), 1);
    assert_eq!(fx.count_status("Copied"), 1);
    fx.assert_file_content(&fx.vol.path().join("z.txt"), "z");
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_fails_file_and_continues() {
    use std::os::unix::fs::PermissionsExt;

    if has_root_privileges() {
        eprintln!("SKIP: root can read files without permission bits");
        return;
    }

    let fx = TestFixture::new();
    let locked = fx.write("a_locked.txt", "secret");
    fx.write("b_open.txt", "open");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let _guard = scopeguard::guard(locked.clone(), |path| {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o644));
    });

    fx.command()
        .assert()
        .success()
        .stderr(predicate::str::contains("Failed to copy"));

    let rows = fx.log_rows();
    assert!(rows[0].starts_with("Failed,a_locked.txt,"));
    assert!(rows[0].contains("Permission denied"));
    assert!(rows[1].starts_with("Copied,b_open.txt,"));
    fx.assert_file_content(&fx.vol.path().join("b_open.txt"), "open");
}
