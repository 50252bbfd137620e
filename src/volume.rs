//! Destination volumes and free-space negotiation.
//!
//! A run writes to exactly one [`DestinationVolume`] at a time. Before each
//! transfer, [`ensure_space`] checks that the file plus the configured safety
//! buffer fits; if not, a [`VolumeSource`] is asked for a replacement and the
//! new volume becomes authoritative before any byte is written.
//!
//! Two kinds of volume source exist:
//!
//! - An interactive prompt (provided by the `spcp` binary) that blocks until
//!   the operator names a mounted volume.
//! - [`QueuedVolumes`], a predetermined list used for automation and tests,
//!   which gives up with [`Error::NoVolumeAvailable`] once exhausted.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

/// The volume files are currently being written to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationVolume {
    root: PathBuf,
}

impl DestinationVolume {
    /// Bind a volume to its root directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the volume.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where a file with the given relative path lands on this volume.
    pub fn destination_for(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }
}

/// Queries free space on a volume.
pub trait SpaceProbe {
    /// Bytes available to an unprivileged writer under `root`.
    fn free_bytes(&self, root: &Path) -> io::Result<u64>;
}

/// [`SpaceProbe`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsSpaceProbe;

impl SpaceProbe for OsSpaceProbe {
    #[cfg(unix)]
    fn free_bytes(&self, root: &Path) -> io::Result<u64> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(root.as_os_str().as_bytes())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        // SAFETY: statvfs is plain old data, zeroed is a valid initial state
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        // SAFETY: c_path is a valid null-terminated string and stat is writable
        let result = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
        if result != 0 {
            return Err(io::Error::last_os_error());
        }

        #[allow(clippy::unnecessary_cast)]
        let free = (stat.f_bavail as u64).saturating_mul(stat.f_frsize as u64);
        Ok(free)
    }

    #[cfg(windows)]
    fn free_bytes(&self, root: &Path) -> io::Result<u64> {
        use std::os::windows::ffi::OsStrExt;
        use windows::Win32::Storage::FileSystem::GetDiskFreeSpaceExW;
        use windows::core::PCWSTR;

        let wide: Vec<u16> = root.as_os_str().encode_wide().chain(Some(0)).collect();
        let mut available: u64 = 0;
        // SAFETY: wide is null-terminated and outlives the call
        unsafe { GetDiskFreeSpaceExW(PCWSTR(wide.as_ptr()), Some(&mut available), None, None) }
            .map_err(io::Error::from)?;
        Ok(available)
    }

    #[cfg(not(any(unix, windows)))]
    fn free_bytes(&self, _root: &Path) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "Free space query not supported on this platform",
        ))
    }
}

/// Supplies destination volumes on demand.
///
/// Called once for the initial volume and again every time the current
/// volume runs out of room.
pub trait VolumeSource {
    /// Obtain a mounted, accessible destination root.
    ///
    /// `prompt` is operator-facing text explaining why a volume is needed.
    ///
    /// # Errors
    ///
    /// Implementations that can give up return [`Error::NoVolumeAvailable`].
    fn acquire(&mut self, prompt: &str) -> Result<DestinationVolume>;
}

/// A [`VolumeSource`] that hands out a predetermined list of roots.
///
/// Roots that do not exist (or are not directories) are skipped. Once the
/// queue is empty, or `max_attempts` candidates have been consumed, every
/// further request fails with [`Error::NoVolumeAvailable`].
///
/// # Example
///
/// ```
/// use spancopy::{QueuedVolumes, VolumeSource};
///
/// let dir = std::env::temp_dir();
/// let mut volumes = QueuedVolumes::new([dir.clone()]);
/// assert_eq!(volumes.acquire("first volume").unwrap().root(), dir.as_path());
/// assert!(volumes.acquire("second volume").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct QueuedVolumes {
    queue: VecDeque<PathBuf>,
    attempts: usize,
    max_attempts: Option<usize>,
    warn_handler: Option<fn(&str)>,
}

impl QueuedVolumes {
    /// Queue the given roots in order.
    pub fn new<I, P>(roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            queue: roots.into_iter().map(Into::into).collect(),
            attempts: 0,
            max_attempts: None,
            warn_handler: None,
        }
    }

    /// Stop after `n` candidates have been tried, even if more are queued.
    #[must_use]
    pub fn with_max_attempts(mut self, n: usize) -> Self {
        self.max_attempts = Some(n);
        self
    }

    /// Report skipped candidates through `handler` instead of tracing.
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Candidates not yet handed out.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn warn(&self, msg: &str) {
        if let Some(handler) = self.warn_handler {
            handler(msg);
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("{}", msg);
        }
    }
}

impl VolumeSource for QueuedVolumes {
    fn acquire(&mut self, prompt: &str) -> Result<DestinationVolume> {
        loop {
            if self.max_attempts.is_some_and(|max| self.attempts >= max) {
                return Err(Error::NoVolumeAvailable {
                    attempts: self.attempts,
                });
            }
            let Some(root) = self.queue.pop_front() else {
                return Err(Error::NoVolumeAvailable {
                    attempts: self.attempts,
                });
            };
            self.attempts += 1;

            if root.is_dir() {
                #[cfg(feature = "tracing")]
                tracing::info!(root = %root.display(), "{}", prompt);
                #[cfg(not(feature = "tracing"))]
                let _ = prompt;
                return Ok(DestinationVolume::new(root));
            }
            self.warn(&format!(
                "Volume {} is not an accessible directory, trying the next one",
                root.display()
            ));
        }
    }
}

/// Turn operator input into a volume root.
///
/// Surrounding whitespace and quotes are removed. On Windows, a bare drive
/// letter (`E` or `E:`) names the root of that drive.
pub fn parse_volume_root(input: &str) -> Option<PathBuf> {
    let trimmed = input.trim().trim_matches('"').trim();
    if trimmed.is_empty() {
        return None;
    }

    #[cfg(windows)]
    {
        let mut chars = trimmed.chars();
        if let Some(letter) = chars.next() {
            if letter.is_ascii_alphabetic() && matches!(chars.as_str(), "" | ":") {
                return Some(PathBuf::from(format!("{}:\\", letter.to_ascii_uppercase())));
            }
        }
    }

    Some(PathBuf::from(trimmed))
}

/// Make sure `required` bytes plus `buffer` fit on `current`.
///
/// Returns the volume to write to and whether it was replaced. When the
/// current volume is too small, `volumes` is asked for a replacement before
/// anything is written; the caller must recompute destination paths against
/// the returned volume.
///
/// A replacement that is itself too small is rejected with a warning through
/// `warn` and another one is requested, so bytes are only ever written to a
/// volume with `required + buffer` free.
///
/// # Errors
///
/// - [`Error::Io`] if free space cannot be queried
/// - [`Error::NoVolumeAvailable`] if the source gives up
pub fn ensure_space(
    required: u64,
    buffer: u64,
    current: DestinationVolume,
    probe: &dyn SpaceProbe,
    volumes: &mut dyn VolumeSource,
    warn: &dyn Fn(&str),
) -> Result<(DestinationVolume, bool)> {
    let needed = required.saturating_add(buffer);
    let free = probe.free_bytes(current.root())?;
    if needed <= free {
        return Ok((current, false));
    }

    let mut prompt = format!(
        "Volume {} has {} free but {} are needed ({} file + {} buffer). Insert a new volume",
        current.root().display(),
        format_bytes(free),
        format_bytes(needed),
        format_bytes(required),
        format_bytes(buffer),
    );
    loop {
        let replacement = volumes.acquire(&prompt)?;
        let free = probe.free_bytes(replacement.root())?;
        if needed <= free {
            return Ok((replacement, true));
        }

        let message = format!(
            "Replacement volume {} also has only {} free ({} needed)",
            replacement.root().display(),
            format_bytes(free),
            format_bytes(needed)
        );
        warn(&message);
        prompt = format!("{message}. Insert a larger volume");
    }
}

/// Human-readable byte count with binary units.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
