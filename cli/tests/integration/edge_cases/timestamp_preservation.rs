//! Timestamp preservation integration tests for spcp CLI.

use crate::common::TestFixture;
use std::fs;
use std::time::{Duration, SystemTime};

/// Helper function to get file modification time
fn get_mtime(path: &std::path::Path) -> SystemTime {
    fs::metadata(path)
        .expect("Failed to get metadata")
        .modified()
        .expect("Failed to get modification time")
}

fn set_old_mtime(path: &std::path::Path) -> SystemTime {
    let old = SystemTime::now() - Duration::from_secs(30 * 24 * 3600);
    fs::File::options()
        .write(true)
        .open(path)
        .and_then(|f| f.set_modified(old))
        .expect("Failed to set modification time");
    get_mtime(path)
}

#[test]
fn test_modification_time_preserved() {
    let fx = TestFixture::new();
    let source = fx.write("test.txt", "content");
    let original = set_old_mtime(&source);

    fx.command().assert().success();

    let copied = get_mtime(&fx.vol.path().join("test.txt"));
    let diff = match copied.duration_since(original) {
        Ok(d) => d,
        Err(e) => e.duration(),
    };
    assert!(
        diff < Duration::from_secs(2),
        "Modification time should be preserved (difference: {:?})",
        diff
    );
}

#[test]
fn test_no_times_uses_current_time() {
    let fx = TestFixture::new();
    let source = fx.write("test.txt", "content");
    let original = set_old_mtime(&source);

    fx.command().arg("--no-times").assert().success();

    let copied = get_mtime(&fx.vol.path().join("test.txt"));
    assert!(
        copied.duration_since(original).unwrap() > Duration::from_secs(24 * 3600),
        "Copy should carry a fresh modification time"
    );
}
