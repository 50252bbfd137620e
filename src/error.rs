//! Error types for spancopy.
//!
//! This module provides the [`Error`] enum containing all errors that can
//! surface from a copy run, the [`ErrorCode`] machine-readable classification,
//! and the [`Result`] type alias.
//!
//! # Error Categories
//!
//! | Category | Errors | Run-fatal |
//! |----------|--------|-----------|
//! | Source | [`Error::NoSourceFiles`] | yes |
//! | Destination | [`Error::NoVolumeAvailable`] | only for the first volume |
//! | Log sink | [`Error::LogSink`] | yes (startup) |
//! | Per file | [`Error::Transfer`], [`Error::CreateDirectory`], [`Error::Io`] | no |
//!
//! Per-file errors never abort a run: the orchestrator records them as a
//! `Failed` outcome and moves on to the next file.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for spancopy operations.
///
/// This is a type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Check if an IO error indicates "no space left on device".
///
/// This helper function detects storage-full conditions across platforms.
/// Space is negotiated before every transfer, so this only fires when the
/// volume filled up underneath us (another writer, filesystem overhead).
///
/// # Platform Support
///
/// | Platform | Error Detection |
/// |----------|-----------------|
/// | Unix | `ENOSPC` (errno 28) |
/// | Windows | `ERROR_DISK_FULL` (0x70) |
///
/// # Example
///
/// ```no_run
/// use std::io;
/// use spancopy::is_no_space_error;
///
/// let error = io::Error::new(io::ErrorKind::StorageFull, "disk full");
/// assert!(is_no_space_error(&error));
/// ```
pub fn is_no_space_error(error: &io::Error) -> bool {
    if error.kind() == io::ErrorKind::StorageFull {
        return true;
    }

    #[cfg(unix)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            return raw_error == libc::ENOSPC;
        }
    }

    #[cfg(windows)]
    {
        if let Some(raw_error) = error.raw_os_error() {
            const ERROR_DISK_FULL: i32 = 112;
            return raw_error == ERROR_DISK_FULL;
        }
    }

    false
}

/// Stable, machine-readable error classification.
///
/// Used by the CLI for `error[code]` messages, JSON output and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    /// No files were found under any existing source root
    NoSourceFiles,
    /// The volume source could not supply a usable destination
    NoVolumeAvailable,
    /// The destination ran out of space
    NoSpace,
    /// Permission denied on source or destination
    PermissionDenied,
    /// The log sink could not be created or written
    LogSink,
    /// Any other IO error
    IoError,
    /// Bug or unexpected internal condition
    Internal,
}

impl ErrorCode {
    /// Snake-case identifier of this code.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoSourceFiles => "no_source_files",
            Self::NoVolumeAvailable => "no_volume_available",
            Self::NoSpace => "no_space",
            Self::PermissionDenied => "permission_denied",
            Self::LogSink => "log_sink",
            Self::IoError => "io_error",
            Self::Internal => "internal",
        }
    }

    /// Classify a raw IO error.
    #[must_use]
    pub fn from_io(error: &io::Error) -> Self {
        if is_no_space_error(error) {
            Self::NoSpace
        } else if error.kind() == io::ErrorKind::PermissionDenied {
            Self::PermissionDenied
        } else {
            Self::IoError
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during a copy run.
///
/// All errors include relevant path information to aid debugging.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// IO error outside of a byte transfer (metadata, free-space query)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Nothing to copy: every configured root was missing or empty
    #[error("No source files found under {} configured root(s)", roots.len())]
    NoSourceFiles {
        /// The configured source roots
        roots: Vec<PathBuf>,
    },

    /// The volume source gave up without producing a usable volume
    #[error("No destination volume available after {attempts} attempt(s)")]
    NoVolumeAvailable {
        /// How many volume candidates were tried
        attempts: usize,
    },

    /// Failed to create or truncate the outcome log
    #[error("Failed to open copy log {path}: {source}")]
    LogSink {
        /// Log file path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Failed to create the destination's parent directories
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A read or write failed while streaming a file
    ///
    /// The partially written destination is left on disk.
    #[error("Transfer failed for {path}: {source}")]
    Transfer {
        /// The path whose open/read/write failed
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },
}

impl Error {
    /// Machine-readable classification of this error.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::NoSourceFiles { .. } => ErrorCode::NoSourceFiles,
            Self::NoVolumeAvailable { .. } => ErrorCode::NoVolumeAvailable,
            Self::LogSink { .. } => ErrorCode::LogSink,
            Self::Io(source)
            | Self::CreateDirectory { source, .. }
            | Self::Transfer { source, .. } => ErrorCode::from_io(source),
        }
    }

    /// Whether the underlying cause is a full destination.
    #[must_use]
    pub fn is_no_space(&self) -> bool {
        self.code() == ErrorCode::NoSpace
    }
}
