//! Per-file records and their terminal outcomes.

use chrono::{DateTime, Local};
use std::fmt;
use std::path::PathBuf;

/// One discovered source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute source path
    pub source: PathBuf,
    /// Size in bytes at enumeration time
    pub size: u64,
    /// Path relative to the matching source root, if any
    pub relative: Option<PathBuf>,
}

/// Terminal classification of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    /// Streamed to the destination volume
    Copied,
    /// A destination file of the same size already existed
    SkippedExisting,
    /// No configured source root contains the file
    SkippedNoRelativePath,
    /// Space negotiation, directory creation or the transfer failed
    Failed,
}

impl OutcomeStatus {
    /// Label written to the `Status` column of the copy log.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Copied => "Copied",
            Self::SkippedExisting => "Skipped",
            Self::SkippedNoRelativePath => "Skipped (NoRelPath)",
            Self::Failed => "Failed",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What happened to one [`FileRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyOutcome {
    pub status: OutcomeStatus,
    pub source: PathBuf,
    pub relative: Option<PathBuf>,
    /// Destination path on the volume that was current when the file finished
    pub destination: Option<PathBuf>,
    pub size: u64,
    pub timestamp: DateTime<Local>,
    /// Failure cause, only set for [`OutcomeStatus::Failed`]
    pub error: Option<String>,
}

impl CopyOutcome {
    fn new(status: OutcomeStatus, record: &FileRecord, destination: Option<PathBuf>) -> Self {
        Self {
            status,
            source: record.source.clone(),
            relative: record.relative.clone(),
            destination,
            size: record.size,
            timestamp: Local::now(),
            error: None,
        }
    }

    pub(crate) fn copied(record: &FileRecord, destination: PathBuf) -> Self {
        Self::new(OutcomeStatus::Copied, record, Some(destination))
    }

    pub(crate) fn skipped_existing(record: &FileRecord, destination: PathBuf) -> Self {
        Self::new(OutcomeStatus::SkippedExisting, record, Some(destination))
    }

    pub(crate) fn skipped_no_relative_path(record: &FileRecord) -> Self {
        Self::new(OutcomeStatus::SkippedNoRelativePath, record, None)
    }

    pub(crate) fn failed(record: &FileRecord, destination: PathBuf, error: String) -> Self {
        Self {
            error: Some(error),
            ..Self::new(OutcomeStatus::Failed, record, Some(destination))
        }
    }
}
