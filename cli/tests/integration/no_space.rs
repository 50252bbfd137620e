//! Volume spanning integration tests for spcp CLI.
//!
//! These tests mount small tmpfs volumes so that real free-space queries
//! force a volume change.
//!
//! # Running these tests
//!
//! These tests require elevated privileges to mount filesystems:
//!
//! ```bash
//! sudo cargo test --test no_space
//! ```
//!
//! If run without privileges, tests will be gracefully skipped.

#[path = "../common/mod.rs"]
mod common;

#[cfg(target_os = "linux")]
mod linux_tests {
    use super::common::{TestFixture, command_exists, count_files_recursive, has_root_privileges};
    use predicates::prelude::*;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;
    use std::process::Command as StdCommand;
    use tempfile::TempDir;

    const FILE_SIZE: usize = 100_000;
    const FILE_COUNT: usize = 15;

    /// Mount a tmpfs of `size` on `path`, returning false if that is not possible.
    fn mount_tmpfs(path: &Path, size: &str) -> bool {
        if !has_root_privileges() {
            eprintln!("SKIP: Test requires root privileges");
            eprintln!("      Run with: sudo cargo test --test no_space");
            return false;
        }
        if !command_exists("mount") {
            eprintln!("SKIP: mount not available");
            return false;
        }
        match StdCommand::new("mount")
            .args(["-t", "tmpfs", "-o", &format!("size={size}"), "tmpfs"])
            .arg(path)
            .output()
        {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                eprintln!(
                    "SKIP: Failed to mount tmpfs: {}",
                    String::from_utf8_lossy(&output.stderr)
                );
                false
            }
            Err(e) => {
                eprintln!("SKIP: Failed to execute mount: {}", e);
                false
            }
        }
    }

    fn unmount(path: &Path) {
        let _ = StdCommand::new("umount").arg(path).output();
    }

    fn assert_complete_files(dir: &Path) {
        for entry in fs::read_dir(dir).expect("Failed to read volume") {
            let path = entry.expect("Failed to read entry").path();
            if path.is_file() {
                assert_eq!(
                    fs::metadata(&path).unwrap().len(),
                    FILE_SIZE as u64,
                    "{} is incomplete",
                    path.display()
                );
            }
        }
    }

    /// A full volume is swapped for the next one before anything is written.
    #[test]
    #[serial]
    fn test_spans_to_second_volume() {
        let small = TempDir::new().expect("Failed to create temp dir");
        if !mount_tmpfs(small.path(), "1M") {
            return;
        }
        let _guard = scopeguard::guard(small.path(), unmount);

        let fx = TestFixture::new();
        fx.create_files(FILE_COUNT, FILE_SIZE);

        fx.bare_command()
            .arg(fx.src.path())
            .arg("--volume")
            .arg(small.path())
            .arg("--volume")
            .arg(fx.vol.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("2 volumes"));

        let on_small = count_files_recursive(small.path());
        let on_large = count_files_recursive(fx.vol.path());
        assert!(on_small > 0, "The first volume should be used");
        assert!(on_small < FILE_COUNT, "The first volume cannot hold everything");
        assert_eq!(on_small + on_large, FILE_COUNT);
        assert_complete_files(small.path());
        assert_complete_files(fx.vol.path());
        assert_eq!(fx.count_status("Copied"), FILE_COUNT);
    }

    /// Without a replacement, files that do not fit fail and the rest continue.
    #[test]
    #[serial]
    fn test_exhausted_volume_records_failures() {
        let small = TempDir::new().expect("Failed to create temp dir");
        if !mount_tmpfs(small.path(), "1M") {
            return;
        }
        let _guard = scopeguard::guard(small.path(), unmount);

        let fx = TestFixture::new();
        fx.create_files(FILE_COUNT, FILE_SIZE);

        fx.bare_command()
            .arg(fx.src.path())
            .arg("--volume")
            .arg(small.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("file(s) failed"));

        let copied = fx.count_status("Copied");
        let failed = fx.count_status("Failed");
        assert!(copied > 0);
        assert!(failed > 0);
        assert_eq!(copied + failed, FILE_COUNT);
        assert_eq!(count_files_recursive(small.path()), copied);
        assert_complete_files(small.path());
    }

    /// The safety buffer is honoured on a real filesystem.
    #[test]
    #[serial]
    fn test_safety_buffer_keeps_room() {
        let small = TempDir::new().expect("Failed to create temp dir");
        if !mount_tmpfs(small.path(), "1M") {
            return;
        }
        let _guard = scopeguard::guard(small.path(), unmount);

        let fx = TestFixture::new();
        fx.create_files(1, FILE_SIZE);

        // 100 KB file + 2 MB buffer never fits on a 1 MB volume
        fx.bare_command()
            .arg(fx.src.path())
            .arg("--buffer")
            .arg("2M")
            .arg("--volume")
            .arg(small.path())
            .arg("--volume")
            .arg(fx.vol.path())
            .assert()
            .success();

        assert_eq!(count_files_recursive(small.path()), 0);
        assert_eq!(count_files_recursive(fx.vol.path()), 1);
    }

    /// A later run with another volume finishes what the first could not.
    #[test]
    #[serial]
    fn test_resume_with_additional_volume() {
        let small = TempDir::new().expect("Failed to create temp dir");
        if !mount_tmpfs(small.path(), "1M") {
            return;
        }
        let _guard = scopeguard::guard(small.path(), unmount);

        let fx = TestFixture::new();
        fx.create_files(FILE_COUNT, FILE_SIZE);

        fx.bare_command()
            .arg(fx.src.path())
            .arg("--volume")
            .arg(small.path())
            .assert()
            .success();
        let first_run_copied = fx.count_status("Copied");

        fx.bare_command()
            .arg(fx.src.path())
            .arg("--volume")
            .arg(small.path())
            .arg("--volume")
            .arg(fx.vol.path())
            .assert()
            .success();

        assert_eq!(fx.count_status("Skipped"), first_run_copied);
        assert_eq!(fx.count_status("Copied"), FILE_COUNT - first_run_copied);
        assert_eq!(
            count_files_recursive(small.path()) + count_files_recursive(fx.vol.path()),
            FILE_COUNT
        );
    }
}
