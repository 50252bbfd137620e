//! Configuration options for copy runs.
//!
//! This module provides [`CopyOptions`], the full set of recognized settings
//! for a run.
//!
//! # Example
//!
//! ```
//! use spancopy::CopyOptions;
//!
//! let options = CopyOptions::new(["/home/me/Documents", "/home/me/Pictures"])
//!     .with_safety_buffer(256 * 1024 * 1024)
//!     .with_chunk_size(4 * 1024 * 1024)
//!     .with_log_path("backup-log.csv");
//! ```

use std::path::PathBuf;

/// Default free space kept on a volume after each write (100 MiB).
pub const DEFAULT_SAFETY_BUFFER: u64 = 100 * 1024 * 1024;

/// Default transfer chunk size (1 MiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Default outcome log location, relative to the working directory.
pub const DEFAULT_LOG_PATH: &str = "CopyLog.csv";

/// Options for a copy run.
///
/// Use [`CopyOptions::new`] with the source roots, then customize using the
/// builder methods.
///
/// # Default Values
///
/// | Field | Default | Description |
/// |-------|---------|-------------|
/// | `source_roots` | (required) | Ordered copy origins |
/// | `safety_buffer_bytes` | 100 MiB | Free space kept after each write |
/// | `chunk_size_bytes` | 1 MiB | Transfer buffer size |
/// | `log_path` | `CopyLog.csv` | Per-run outcome log |
/// | `preserve_timestamps` | `true` | Copy file mtime/atime |
///
/// # Example
///
/// ```
/// use spancopy::CopyOptions;
///
/// let options = CopyOptions::new(["/data"])
///     .with_safety_buffer(0)      // Fill volumes completely
///     .without_timestamps();
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CopyOptions {
    /// Directories to copy from, in priority order
    ///
    /// When roots are nested, the first configured root that contains a file
    /// determines its relative path.
    pub source_roots: Vec<PathBuf>,

    /// Minimum free space to leave on the destination after a write
    ///
    /// Driving a removable volume to exactly zero free bytes upsets some
    /// filesystems, so a file only goes onto the current volume if
    /// `size + safety_buffer_bytes` fits.
    pub safety_buffer_bytes: u64,

    /// Size of the reusable transfer buffer (default: 1 MiB)
    pub chunk_size_bytes: usize,

    /// Where the per-run CSV outcome log is written
    ///
    /// The log is truncated at the start of every run.
    pub log_path: PathBuf,

    /// Whether to preserve file timestamps (default: true)
    pub preserve_timestamps: bool,

    /// Callback for warnings (optional)
    ///
    /// If not set and `tracing` feature is enabled, warnings are logged via tracing.
    /// Otherwise, warnings are silently ignored.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub warn_handler: Option<fn(&str)>,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            source_roots: Vec::new(),
            safety_buffer_bytes: DEFAULT_SAFETY_BUFFER,
            chunk_size_bytes: DEFAULT_CHUNK_SIZE,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            preserve_timestamps: true,
            warn_handler: None,
        }
    }
}

impl CopyOptions {
    /// Create options for the given source roots with default settings.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            source_roots: roots.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Append a source root (lowest priority so far)
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_roots.push(root.into());
        self
    }

    /// Set the safety buffer in bytes
    #[must_use]
    pub fn with_safety_buffer(mut self, bytes: u64) -> Self {
        self.safety_buffer_bytes = bytes;
        self
    }

    /// Set the transfer chunk size
    ///
    /// Value is clamped to at least 1 to keep the copy loop progressing.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size_bytes = bytes.max(1);
        self
    }

    /// Set the outcome log path
    #[must_use]
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Disable timestamp preservation
    #[must_use]
    pub fn without_timestamps(mut self) -> Self {
        self.preserve_timestamps = false;
        self
    }

    /// Create options with a warning handler
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    pub(crate) fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }

    pub(crate) fn debug(&self, msg: &str) {
        #[cfg(feature = "tracing")]
        tracing::debug!("{}", msg);
        #[cfg(not(feature = "tracing"))]
        let _ = msg;
    }
}
