//! Relative path resolution across several source roots.
//!
//! Every source file is written to the destination volume under its path
//! relative to the source root that contains it. Roots are consulted in the
//! configured order and the first one that contains the file wins, so nested
//! roots resolve against whichever was listed first.

use std::path::{Path, PathBuf};

/// Resolve `path` against the first root in `roots` that contains it.
///
/// Matching is component-wise: `/src/A` contains `/src/A/doc.txt` but not
/// `/src/AB/doc.txt`. The returned path never starts with a separator and
/// never names the root itself.
///
/// Returns `None` if no root contains the path, or if the path *is* a root.
///
/// # Example
///
/// ```
/// use std::path::{Path, PathBuf};
/// use spancopy::relative_path;
///
/// let roots = [PathBuf::from("/src/A"), PathBuf::from("/src/B")];
/// assert_eq!(
///     relative_path(Path::new("/src/B/photos/cat.jpg"), &roots),
///     Some(PathBuf::from("photos/cat.jpg"))
/// );
/// assert_eq!(relative_path(Path::new("/other/x.txt"), &roots), None);
/// ```
pub fn relative_path(path: &Path, roots: &[PathBuf]) -> Option<PathBuf> {
    roots.iter().find_map(|root| {
        let remainder = path.strip_prefix(root).ok()?;
        if remainder.as_os_str().is_empty() {
            None
        } else {
            Some(remainder.to_path_buf())
        }
    })
}
