//! Nested and overlapping source roots.
//!
//! The first configured root that contains a file decides its relative path.

use crate::common::{TestFixture, count_files_recursive};
use std::fs;

#[test]
fn test_nested_root_resolves_against_first() {
    let fx = TestFixture::new();
    let outer = fx.src.path().join("outer");
    let inner = outer.join("inner");
    fs::create_dir_all(&inner).unwrap();
    fs::write(inner.join("f.txt"), "f").unwrap();

    fx.bare_command()
        .arg(&outer)
        .arg(&inner)
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .success();

    // Enumerated once per root; both resolve to inner/f.txt
    assert_eq!(fx.count_status("Copied"), 1);
    assert_eq!(fx.count_status("Skipped"), 1);
    assert!(fx.vol.path().join("inner/f.txt").is_file());
    assert!(!fx.vol.path().join("f.txt").exists());
}

#[test]
fn test_inner_root_first_flattens() {
    let fx = TestFixture::new();
    let outer = fx.src.path().join("outer");
    let inner = outer.join("inner");
    fs::create_dir_all(&inner).unwrap();
    fs::write(inner.join("f.txt"), "f").unwrap();

    fx.bare_command()
        .arg(&inner)
        .arg(&outer)
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .success();

    assert!(fx.vol.path().join("f.txt").is_file());
    assert!(!fx.vol.path().join("inner").exists());
}

#[test]
fn test_same_relative_path_in_two_roots() {
    // Both roots hold docs/a.txt with different sizes: the later one replaces
    // the earlier one because its size differs
    let fx = TestFixture::new();
    let a = fx.src.path().join("A");
    let b = fx.src.path().join("B");
    fs::create_dir_all(a.join("docs")).unwrap();
    fs::create_dir_all(b.join("docs")).unwrap();
    fs::write(a.join("docs/a.txt"), "from A").unwrap();
    fs::write(b.join("docs/a.txt"), "from B, longer").unwrap();

    fx.bare_command()
        .arg(&a)
        .arg(&b)
        .arg("--volume")
        .arg(fx.vol.path())
        .assert()
        .success();

    assert_eq!(fx.count_status("Copied"), 2);
    assert_eq!(count_files_recursive(fx.vol.path()), 1);
    fx.assert_file_content(&fx.vol.path().join("docs/a.txt"), "from B, longer");
}
