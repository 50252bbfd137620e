//! Builder API for ergonomic copy runs.
//!
//! The builder pattern provides a fluent interface for configuring and executing
//! a run. This is often more convenient than wiring [`CopyOptions`], a
//! [`CopyLog`], a [`VolumeSource`] and a [`SpaceProbe`] together by hand.
//!
//! # Examples
//!
//! ## Basic Usage
//!
//! ```no_run
//! use spancopy::CopyBuilder;
//!
//! // Copy two roots, spanning across two pre-mounted volumes
//! let stats = CopyBuilder::new(["/home/me/Documents", "/home/me/Pictures"])
//!     .volume("/media/usb0")
//!     .volume("/media/usb1")
//!     .run()?;
//! println!("Copied {} files", stats.files_copied);
//! # Ok::<(), spancopy::Error>(())
//! ```
//!
//! ## With Options
//!
//! ```no_run
//! use spancopy::CopyBuilder;
//!
//! let stats = CopyBuilder::new(["/data"])
//!     .volume("/mnt/backup")
//!     .safety_buffer(0)           // Fill the volume completely
//!     .chunk_size(8 * 1024 * 1024)
//!     .log_path("/var/log/spancopy.csv")
//!     .no_timestamps()
//!     .run()?;
//! # Ok::<(), spancopy::Error>(())
//! ```

use crate::copy::{CopyStats, copy_roots};
use crate::error::Result;
use crate::log::CopyLog;
use crate::options::CopyOptions;
use crate::progress::{NoProgress, ProgressObserver};
use crate::volume::{OsSpaceProbe, QueuedVolumes, SpaceProbe, VolumeSource};
use std::path::PathBuf;

/// A builder for configuring and executing copy runs.
///
/// Without an explicit [`volumes`](Self::volumes) source, the roots passed to
/// [`volume`](Self::volume) are handed out in order, and the run gives up
/// once they are exhausted.
///
/// # Example
///
/// ```no_run
/// use spancopy::{CopyBuilder, QueuedVolumes};
///
/// let stats = CopyBuilder::new(["/data/project"])
///     .volumes(QueuedVolumes::new(["/media/a", "/media/b"]).with_max_attempts(5))
///     .run()?;
/// # Ok::<(), spancopy::Error>(())
/// ```
pub struct CopyBuilder {
    options: CopyOptions,
    queued: Vec<PathBuf>,
    volumes: Option<Box<dyn VolumeSource>>,
    probe: Box<dyn SpaceProbe>,
    progress: Box<dyn ProgressObserver>,
}

impl CopyBuilder {
    /// Create a new `CopyBuilder` for the given source roots.
    ///
    /// Uses default options (100 MiB buffer, 1 MiB chunks, `CopyLog.csv`,
    /// preserve timestamps), the OS free-space probe and no progress output.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            options: CopyOptions::new(roots),
            queued: Vec::new(),
            volumes: None,
            probe: Box::new(OsSpaceProbe),
            progress: Box::new(NoProgress),
        }
    }

    /// Add another source root (lowest priority so far).
    #[must_use]
    pub fn source(mut self, root: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_source_root(root);
        self
    }

    /// Queue a destination volume root.
    ///
    /// Ignored when a custom source is set with [`volumes`](Self::volumes).
    #[must_use]
    pub fn volume(mut self, root: impl Into<PathBuf>) -> Self {
        self.queued.push(root.into());
        self
    }

    /// Use a custom [`VolumeSource`], e.g. an interactive prompt.
    #[must_use]
    pub fn volumes(mut self, source: impl VolumeSource + 'static) -> Self {
        self.volumes = Some(Box::new(source));
        self
    }

    /// Free space to keep on a volume after each write.
    #[must_use]
    pub fn safety_buffer(mut self, bytes: u64) -> Self {
        self.options = self.options.with_safety_buffer(bytes);
        self
    }

    /// Transfer buffer size.
    #[must_use]
    pub fn chunk_size(mut self, bytes: usize) -> Self {
        self.options = self.options.with_chunk_size(bytes);
        self
    }

    /// Where the outcome log is written.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.options = self.options.with_log_path(path);
        self
    }

    /// Don't preserve file timestamps.
    #[must_use]
    pub fn no_timestamps(mut self) -> Self {
        self.options = self.options.without_timestamps();
        self
    }

    /// Replace the OS free-space query.
    #[must_use]
    pub fn space_probe(mut self, probe: impl SpaceProbe + 'static) -> Self {
        self.probe = Box::new(probe);
        self
    }

    /// Receive per-file and per-run progress updates.
    #[must_use]
    pub fn progress(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.progress = Box::new(observer);
        self
    }

    /// Set a warning handler.
    ///
    /// The handler receives missing roots, skipped volumes, space warnings
    /// and per-file failures.
    #[must_use]
    pub fn on_warning(mut self, handler: fn(&str)) -> Self {
        self.options = self.options.with_warn_handler(handler);
        self
    }

    /// Get a reference to the current options.
    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Execute the run.
    ///
    /// The log at [`CopyOptions::log_path`] is truncated before enumeration
    /// starts.
    ///
    /// # Errors
    ///
    /// - [`Error::LogSink`](crate::Error::LogSink) if the log cannot be created
    /// - [`Error::NoSourceFiles`](crate::Error::NoSourceFiles) if nothing was found
    /// - [`Error::NoVolumeAvailable`](crate::Error::NoVolumeAvailable) if no
    ///   initial volume can be obtained
    pub fn run(self) -> Result<CopyStats> {
        let Self {
            options,
            queued,
            volumes,
            probe,
            mut progress,
        } = self;

        let mut volumes = volumes.unwrap_or_else(|| {
            let mut queue = QueuedVolumes::new(queued);
            if let Some(handler) = options.warn_handler {
                queue = queue.with_warn_handler(handler);
            }
            Box::new(queue) as Box<dyn VolumeSource>
        });

        let mut log = CopyLog::create(&options.log_path)?;
        if let Some(handler) = options.warn_handler {
            log = log.with_warn_handler(handler);
        }

        copy_roots(
            &options,
            volumes.as_mut(),
            probe.as_ref(),
            progress.as_mut(),
            &mut log,
        )
    }
}
