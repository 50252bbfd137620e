//! Utility functions for file copy operations.
//!
//! This module contains the change detection rule, parent directory
//! creation and timestamp preservation used by the orchestrator and the
//! stream copier.

use crate::error::{Error, Result};
use filetime::{FileTime, set_file_times};
use std::fs::{self, Metadata};
use std::io;
use std::path::Path;

// =============================================================================
// Change detection
// =============================================================================

/// Whether an existing destination file counts as already transferred.
///
/// Only byte length is compared: no timestamps, no content. A missing
/// destination, a non-file, or unreadable metadata never skips. A file of a
/// different size is overwritten in full.
#[inline]
pub fn should_skip(destination: &Path, source_size: u64) -> bool {
    match fs::metadata(destination) {
        Ok(meta) => meta.is_file() && meta.len() == source_size,
        Err(_) => false,
    }
}

// =============================================================================
// Directory utilities
// =============================================================================

/// Create every missing directory above `destination`.
pub(crate) fn ensure_parent_dir(destination: &Path) -> Result<()> {
    let Some(parent) = destination.parent() else {
        return Ok(());
    };
    if parent.as_os_str().is_empty() || parent.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|source| Error::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    })
}

// =============================================================================
// Metadata and timestamp utilities
// =============================================================================

/// Preserve file timestamps (mtime and atime)
pub(crate) fn preserve_timestamps(src_meta: &Metadata, dst: &Path) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(src_meta);
    let atime = FileTime::from_last_access_time(src_meta);
    set_file_times(dst, atime, mtime)
}

// =============================================================================
// Tests
// =============================================================================
