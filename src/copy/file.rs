//! Single file copy operations.
//!
//! Files are streamed through one reusable chunk buffer so progress can be
//! reported after every chunk. There is no temp file and no rename: a failed
//! transfer leaves the partially written destination in place for the
//! operator to inspect, and the orchestrator records it as failed.

use crate::error::{Error, Result};
use crate::options::CopyOptions;
use crate::progress::{FileProgress, ProgressObserver};
use std::fs::{self, File};
use std::io::{self, Read, Write};
use std::path::Path;

use super::utils::preserve_timestamps;

/// Stream `src` into `dst` in chunks of `chunk_size` bytes.
///
/// The destination is created or truncated. After every chunk,
/// [`ProgressObserver::file_progress`] receives the running total against
/// `expected`. [`ProgressObserver::file_completed`] is always called once the
/// loop ends, whether it succeeded or not. Both file handles are closed on
/// every exit path.
///
/// # Returns
///
/// The number of bytes written.
///
/// # Errors
///
/// Returns [`Error::Transfer`] naming the source (open/read failures) or the
/// destination (create/write failures). The partial destination is not
/// removed.
pub fn stream_copy(
    src: &Path,
    dst: &Path,
    expected: u64,
    chunk_size: usize,
    label: &str,
    progress: &mut dyn ProgressObserver,
) -> Result<u64> {
    progress.file_started(label, expected);
    let result = transfer(src, dst, expected, chunk_size, label, progress);
    progress.file_completed(label);
    result
}

fn transfer(
    src: &Path,
    dst: &Path,
    expected: u64,
    chunk_size: usize,
    label: &str,
    progress: &mut dyn ProgressObserver,
) -> Result<u64> {
    let read_error = |source| Error::Transfer {
        path: src.to_path_buf(),
        source,
    };
    let write_error = |source| Error::Transfer {
        path: dst.to_path_buf(),
        source,
    };

    let mut reader = File::open(src).map_err(read_error)?;
    let mut writer = File::create(dst).map_err(write_error)?;
    let mut buffer = vec![0u8; chunk_size.max(1)];
    let mut total: u64 = 0;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        };
        writer.write_all(&buffer[..n]).map_err(write_error)?;
        total += n as u64;
        progress.file_progress(label, FileProgress::new(total, expected));
    }

    if total == 0 {
        progress.file_progress(label, FileProgress::new(0, expected));
    }

    writer.flush().map_err(write_error)?;
    Ok(total)
}

/// Copy one file with the configured chunk size, then apply metadata.
///
/// Timestamp preservation errors are ignored, they're not critical.
pub(crate) fn copy_file(
    src: &Path,
    dst: &Path,
    expected: u64,
    label: &str,
    options: &CopyOptions,
    progress: &mut dyn ProgressObserver,
) -> Result<u64> {
    let bytes = stream_copy(src, dst, expected, options.chunk_size_bytes, label, progress)?;

    if options.preserve_timestamps {
        if let Ok(src_meta) = fs::metadata(src) {
            let _ = preserve_timestamps(&src_meta, dst);
        }
    }

    Ok(bytes)
}

// =============================================================================
// Tests
// =============================================================================
