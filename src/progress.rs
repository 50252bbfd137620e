//! Progress reporting.
//!
//! The copy engine reports progress through a caller-supplied
//! [`ProgressObserver`] at two granularities: per file (after every chunk)
//! and per run (after every file). [`NoProgress`] discards everything; with
//! the `progress` feature, [`BarProgress`] drives two indicatif bars.

/// Progress of a single file transfer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileProgress {
    /// Bytes written so far
    pub bytes: u64,
    /// Size the file had when it was enumerated
    pub total: u64,
    /// `bytes / total * 100`, rounded to two decimal places, at most 100
    pub percent: f64,
}

impl FileProgress {
    pub(crate) fn new(bytes: u64, total: u64) -> Self {
        Self {
            bytes,
            total,
            percent: percent_complete(bytes, total),
        }
    }
}

/// Percentage rounded to two decimals. An empty total counts as complete.
pub fn percent_complete(done: u64, total: u64) -> f64 {
    if total == 0 {
        return 100.0;
    }
    let percent = (done as f64 / total as f64 * 100.0 * 100.0).round() / 100.0;
    percent.min(100.0)
}

/// Receives progress updates from a copy run.
///
/// All methods default to doing nothing.
pub trait ProgressObserver {
    /// A file transfer is about to start.
    fn file_started(&mut self, _label: &str, _total: u64) {}

    /// Called after every chunk written.
    fn file_progress(&mut self, _label: &str, _progress: FileProgress) {}

    /// The transfer loop ended, successfully or not.
    fn file_completed(&mut self, _label: &str) {}

    /// `done` of `total` files have reached a terminal outcome.
    fn run_progress(&mut self, _label: &str, _done: usize, _total: usize) {}

    /// The run finished processing every file.
    fn run_completed(&mut self) {}
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

#[cfg(feature = "progress")]
pub use bars::{BarProgress, create_progress_bar};

#[cfg(feature = "progress")]
mod bars {
    use super::{FileProgress, ProgressObserver};
    use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

    /// Create a default progress bar for the whole run
    #[must_use]
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} files ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    }

    fn create_file_bar() -> ProgressBar {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("  [{bar:40.green/white}] {bytes}/{total_bytes} {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    }

    /// Two indicatif bars: one for the run, one for the file in flight.
    ///
    /// Hand [`multi`](Self::multi) to anything that needs to print while the
    /// bars are drawn (e.g. a volume prompt) so it can suspend them.
    pub struct BarProgress {
        multi: MultiProgress,
        overall: Option<ProgressBar>,
        file: Option<ProgressBar>,
    }

    impl BarProgress {
        pub fn new() -> Self {
            Self {
                multi: MultiProgress::new(),
                overall: None,
                file: None,
            }
        }

        /// The shared draw target of both bars.
        pub fn multi(&self) -> MultiProgress {
            self.multi.clone()
        }

        fn overall(&mut self, total: usize) -> &ProgressBar {
            self.overall
                .get_or_insert_with(|| self.multi.add(create_progress_bar(total as u64)))
        }
    }

    impl Default for BarProgress {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProgressObserver for BarProgress {
        fn file_started(&mut self, label: &str, total: u64) {
            let bar = self.multi.add(create_file_bar());
            bar.set_length(total);
            bar.set_message(label.to_string());
            if let Some(old) = self.file.replace(bar) {
                old.finish_and_clear();
            }
        }

        fn file_progress(&mut self, _label: &str, progress: FileProgress) {
            if let Some(bar) = &self.file {
                bar.set_position(progress.bytes.min(progress.total));
            }
        }

        fn file_completed(&mut self, _label: &str) {
            if let Some(bar) = self.file.take() {
                bar.finish_and_clear();
            }
        }

        fn run_progress(&mut self, label: &str, done: usize, total: usize) {
            let bar = self.overall(total);
            bar.set_position(done as u64);
            bar.set_message(label.to_string());
        }

        fn run_completed(&mut self) {
            if let Some(bar) = self.file.take() {
                bar.finish_and_clear();
            }
            if let Some(bar) = self.overall.take() {
                bar.finish_and_clear();
            }
        }
    }
}
