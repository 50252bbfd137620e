//! Core copy operations.
//!
//! This module provides the per-file streaming transfer, the size-based
//! change detection rule and the multi-root orchestration that spans a run
//! across destination volumes.

mod dir;
mod file;
mod utils;

// Re-export public API
pub use dir::{CopyStats, INITIAL_VOLUME_PROMPT, copy_roots};
pub use file::stream_copy;
pub use utils::should_skip;
