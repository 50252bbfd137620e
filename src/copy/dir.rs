//! Multi-root copy orchestration.
//!
//! This module enumerates every configured source root and drives each file
//! through resolution, change detection, space negotiation and the streamed
//! transfer, recording exactly one outcome per file.

use crate::error::{Error, Result};
use crate::log::CopyLog;
use crate::options::CopyOptions;
use crate::outcome::{CopyOutcome, FileRecord, OutcomeStatus};
use crate::progress::ProgressObserver;
use crate::utils::path::relative_path;
use crate::volume::{DestinationVolume, SpaceProbe, VolumeSource, ensure_space, format_bytes};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use super::file::copy_file;
use super::utils::{ensure_parent_dir, should_skip};

/// Prompt used for the first destination volume of a run.
pub const INITIAL_VOLUME_PROMPT: &str = "Select the destination volume";

/// Statistics from a copy run.
///
/// Returned by [`copy_roots`]. Every enumerated file appears exactly once in
/// `outcomes`, in processing order.
///
/// # Example
///
/// ```no_run
/// use spancopy::{CopyLog, CopyOptions, NoProgress, OsSpaceProbe, QueuedVolumes, copy_roots};
/// use std::path::Path;
///
/// let options = CopyOptions::new(["/home/me/Documents"]);
/// let mut volumes = QueuedVolumes::new(["/media/usb0", "/media/usb1"]);
/// let mut log = CopyLog::create(Path::new("CopyLog.csv"))?;
/// let stats = copy_roots(&options, &mut volumes, &OsSpaceProbe, &mut NoProgress, &mut log)?;
/// println!("Copied {} files ({} bytes)", stats.files_copied, stats.bytes_copied);
/// # Ok::<(), spancopy::Error>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    /// Number of files streamed to a volume
    pub files_copied: u64,
    /// Number of files skipped because an equal-size copy already existed
    pub files_skipped: u64,
    /// Number of files under no configured root
    pub files_unresolved: u64,
    /// Number of files that failed
    pub files_failed: u64,
    /// Total bytes copied
    pub bytes_copied: u64,
    /// Distinct destination volumes written to or checked, in order
    pub volumes: Vec<PathBuf>,
    /// Duration of the run
    pub duration: Duration,
    /// One outcome per enumerated file
    pub outcomes: Vec<CopyOutcome>,
}

impl CopyStats {
    /// Total number of files considered.
    pub fn files_total(&self) -> u64 {
        self.files_copied + self.files_skipped + self.files_unresolved + self.files_failed
    }

    fn push(&mut self, outcome: CopyOutcome) {
        match outcome.status {
            OutcomeStatus::Copied => {
                self.files_copied += 1;
                self.bytes_copied += outcome.size;
            }
            OutcomeStatus::SkippedExisting => self.files_skipped += 1,
            OutcomeStatus::SkippedNoRelativePath => self.files_unresolved += 1,
            OutcomeStatus::Failed => self.files_failed += 1,
        }
        self.outcomes.push(outcome);
    }
}

/// Copy every file under the configured roots onto destination volumes.
///
/// # Per-file state machine
///
/// 1. Resolve the relative path; no containing root -> `SkippedNoRelativePath`
/// 2. Same-size file already at the destination -> `SkippedExisting`
/// 3. Negotiate space; a replacement volume re-bases the destination path
/// 4. Create the parent directories
/// 5. Stream the bytes -> `Copied` or `Failed`
///
/// Every outcome is appended to `log` as soon as it is known. A failing file
/// never stops the run.
///
/// The skip check in step 2 looks at the volume that is current when the file
/// is reached. A file that triggers a swap is copied to the new volume even if
/// an earlier run already left a same-size copy there.
///
/// # Errors
///
/// Only run-level conditions are errors:
/// - [`Error::NoSourceFiles`] if nothing was found (checked before any
///   volume is requested)
/// - [`Error::NoVolumeAvailable`] if no initial volume can be obtained
pub fn copy_roots<W: Write>(
    options: &CopyOptions,
    volumes: &mut dyn VolumeSource,
    space: &dyn SpaceProbe,
    progress: &mut dyn ProgressObserver,
    log: &mut CopyLog<W>,
) -> Result<CopyStats> {
    let start_time = Instant::now();

    // Phase 1: Enumerate all roots
    let files = enumerate_roots(options);
    if files.is_empty() {
        return Err(Error::NoSourceFiles {
            roots: options.source_roots.clone(),
        });
    }
    let total_files = files.len();
    options.debug(&format!(
        "found {} files under {} roots",
        total_files,
        options.source_roots.len()
    ));

    // Phase 2: Bind the first volume
    let mut volume = volumes.acquire(INITIAL_VOLUME_PROMPT)?;
    let mut stats = CopyStats {
        volumes: vec![volume.root().to_path_buf()],
        ..CopyStats::default()
    };

    // Phase 3: One file at a time
    for (index, mut record) in files.into_iter().enumerate() {
        record.relative = relative_path(&record.source, &options.source_roots);
        let (outcome, current) = process_file(&record, volume, options, volumes, space, progress);
        volume = current;
        if stats.volumes.last().map(PathBuf::as_path) != Some(volume.root()) {
            stats.volumes.push(volume.root().to_path_buf());
        }

        log.record(&outcome);
        progress.run_progress(&record.source.display().to_string(), index + 1, total_files);
        stats.push(outcome);
    }

    progress.run_completed();
    stats.duration = start_time.elapsed();
    Ok(stats)
}

/// Drive one file to its terminal outcome.
///
/// Returns the outcome and the volume that is current afterwards.
fn process_file(
    record: &FileRecord,
    volume: DestinationVolume,
    options: &CopyOptions,
    volumes: &mut dyn VolumeSource,
    space: &dyn SpaceProbe,
    progress: &mut dyn ProgressObserver,
) -> (CopyOutcome, DestinationVolume) {
    let Some(relative) = record.relative.as_deref() else {
        options.warn(&format!(
            "{} is not under any configured source root, skipping",
            record.source.display()
        ));
        return (CopyOutcome::skipped_no_relative_path(record), volume);
    };

    let destination = volume.destination_for(relative);
    if should_skip(&destination, record.size) {
        options.debug(&format!(
            "skipped {} -> {} (same size exists)",
            record.source.display(),
            destination.display()
        ));
        return (CopyOutcome::skipped_existing(record, destination), volume);
    }

    let warn = |msg: &str| options.warn(msg);
    let volume = match ensure_space(
        record.size,
        options.safety_buffer_bytes,
        volume.clone(),
        space,
        volumes,
        &warn,
    ) {
        Ok((volume, replaced)) => {
            if replaced {
                options.warn(&format!(
                    "Switched destination volume to {}",
                    volume.root().display()
                ));
            }
            volume
        }
        Err(e) => {
            options.warn(&format!(
                "No room for {} ({}): {}",
                record.source.display(),
                format_bytes(record.size),
                e
            ));
            return (CopyOutcome::failed(record, destination, e.to_string()), volume);
        }
    };

    // The volume may have changed, so the destination is recomputed
    let destination = volume.destination_for(relative);
    let label = relative.display().to_string();

    let result = ensure_parent_dir(&destination).and_then(|()| {
        copy_file(
            &record.source,
            &destination,
            record.size,
            &label,
            options,
            progress,
        )
    });

    let outcome = match result {
        Ok(bytes) => {
            options.debug(&format!(
                "copied {} -> {} ({} bytes)",
                record.source.display(),
                destination.display(),
                bytes
            ));
            CopyOutcome::copied(record, destination)
        }
        Err(e) => {
            if e.is_no_space() {
                options.warn(&format!(
                    "{} ran out of space while copying {}",
                    volume.root().display(),
                    record.source.display()
                ));
            }
            options.warn(&format!("Failed to copy {}: {}", record.source.display(), e));
            CopyOutcome::failed(record, destination, e.to_string())
        }
    };
    (outcome, volume)
}

/// Collect every regular file under the configured roots, in root order.
///
/// Missing roots and unreadable directories are warned about and skipped.
fn enumerate_roots(options: &CopyOptions) -> Vec<FileRecord> {
    let mut files = Vec::new();
    for root in &options.source_roots {
        if !root.is_dir() {
            options.warn(&format!(
                "Source root {} does not exist, skipping",
                root.display()
            ));
            continue;
        }
        collect_files(root, &mut files, options);
    }
    files
}

/// Recursively collect files below `dir`, sorted by name.
///
/// Directory symlinks are not descended; file symlinks are followed for
/// their size.
fn collect_files(dir: &Path, files: &mut Vec<FileRecord>, options: &CopyOptions) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            options.warn(&format!("Cannot read directory {}: {}", dir.display(), e));
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries.filter_map(|e| e.ok()).map(|e| e.path()).collect();
    paths.sort();

    for path in paths {
        let Ok(link_meta) = fs::symlink_metadata(&path) else {
            continue;
        };
        if link_meta.is_dir() {
            collect_files(&path, files, options);
            continue;
        }
        match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => files.push(FileRecord {
                source: path,
                size: meta.len(),
                relative: None,
            }),
            Ok(_) => {}
            Err(e) => options.warn(&format!("Cannot stat {}: {}", path.display(), e)),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
