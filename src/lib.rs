//! # spancopy
//!
//! Copy directory trees from several source roots onto a sequence of
//! removable destination volumes, swapping volumes when one fills up.
//!
//! ## Core Features
//!
//! - **Multi-root**: Several source roots merge into one destination tree
//! - **Volume spanning**: When a file (plus a safety buffer) no longer fits,
//!   a replacement volume is requested *before* any byte is written
//! - **Resumable**: A destination file of the same size counts as done, so
//!   re-running after an interruption only copies what is missing
//! - **Chunked streaming**: Per-file progress after every chunk
//! - **Audit log**: One CSV row per file, flushed as soon as it is known
//! - **Timestamp preserving**: Copies file modification and access times
//!
//! ## Quick Start with Builder API
//!
//! ```no_run
//! use spancopy::CopyBuilder;
//!
//! let stats = CopyBuilder::new(["/home/me/Documents"])
//!     .volume("/media/usb0")
//!     .volume("/media/usb1")
//!     .run()?;
//! println!("Copied {} files ({} bytes) across {} volume(s)",
//!     stats.files_copied, stats.bytes_copied, stats.volumes.len());
//! # Ok::<(), spancopy::Error>(())
//! ```
//!
//! ## Function API
//!
//! For full control over collaborators, call [`copy_roots`] directly:
//!
//! ```no_run
//! use spancopy::{CopyLog, CopyOptions, NoProgress, OsSpaceProbe, QueuedVolumes, copy_roots};
//!
//! let options = CopyOptions::new(["/data/a", "/data/b"])
//!     .with_safety_buffer(256 * 1024 * 1024)
//!     .with_log_path("run.csv");
//! let mut log = CopyLog::create(&options.log_path)?;
//! let mut volumes = QueuedVolumes::new(["/mnt/disk1", "/mnt/disk2"]);
//!
//! let stats = copy_roots(&options, &mut volumes, &OsSpaceProbe, &mut NoProgress, &mut log)?;
//! println!("{} failed", stats.files_failed);
//! # Ok::<(), spancopy::Error>(())
//! ```
//!
//! ## Guarantees
//!
//! ### One outcome per file
//!
//! Every enumerated file ends as exactly one of `Copied`, `Skipped`,
//! `Skipped (NoRelPath)` or `Failed`, and that outcome is appended to the log
//! before the next file starts. Per-file failures never abort a run.
//!
//! ### Space before bytes
//!
//! Space negotiation happens before the destination is created, so a volume
//! swap never leaves a partial file behind on the abandoned volume. A
//! transfer that fails midway leaves its partial file in place and is
//! recorded as `Failed`; the next run overwrites it because its size differs.
//!
//! ## Optional Features
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `progress` | Progress bar support with indicatif |
//! | `tracing` | Structured logging with tracing crate |
//! | `serde` | Serialize/Deserialize for [`CopyOptions`] |
//! | `full` | Enable all optional features |

#![cfg_attr(docsrs, feature(doc_cfg))]

mod builder;
mod copy;
mod error;
mod log;
mod options;
mod outcome;
mod progress;
mod utils;
mod volume;

pub use builder::CopyBuilder;
pub use copy::{CopyStats, INITIAL_VOLUME_PROMPT, copy_roots, should_skip, stream_copy};
pub use error::{Error, ErrorCode, Result, is_no_space_error};
pub use log::{CopyLog, LOG_HEADER};
pub use options::{CopyOptions, DEFAULT_CHUNK_SIZE, DEFAULT_LOG_PATH, DEFAULT_SAFETY_BUFFER};
pub use outcome::{CopyOutcome, FileRecord, OutcomeStatus};
pub use progress::{FileProgress, NoProgress, ProgressObserver, percent_complete};
pub use utils::path::relative_path;
pub use volume::{
    DestinationVolume, OsSpaceProbe, QueuedVolumes, SpaceProbe, VolumeSource, ensure_space,
    format_bytes, parse_volume_root,
};

#[cfg(feature = "progress")]
#[cfg_attr(docsrs, doc(cfg(feature = "progress")))]
pub use progress::{BarProgress, create_progress_bar};
