//! Append-only CSV record of every file considered in a run.
//!
//! The log is truncated and its header rewritten at the start of each run,
//! so it always describes exactly one run. Each row is flushed as soon as it
//! is written: a crash loses at most the file that was in flight.
//!
//! # Format
//!
//! ```text
//! Status,RelativePath,SourcePath,Destination,SizeBytes,Timestamp,Error
//! Copied,docs/a.txt,/src/A/docs/a.txt,/media/usb/docs/a.txt,10,2024-05-01 12:00:00,
//! Skipped (NoRelPath),,/other/x.txt,,3,2024-05-01 12:00:01,
//! ```

use crate::error::{Error, Result};
use crate::outcome::CopyOutcome;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Header row written at the top of every log.
pub const LOG_HEADER: [&str; 7] = [
    "Status",
    "RelativePath",
    "SourcePath",
    "Destination",
    "SizeBytes",
    "Timestamp",
    "Error",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Handle to the outcome log for one run.
///
/// [`record`](Self::record) never fails: once the sink has been opened, a
/// write error is reported as a warning and the run continues.
pub struct CopyLog<W: Write = BufWriter<File>> {
    writer: W,
    path: Option<PathBuf>,
    write_errors: usize,
    warn_handler: Option<fn(&str)>,
}

impl CopyLog<BufWriter<File>> {
    /// Create (or truncate) the log file at `path` and write the header.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LogSink`] if the file cannot be created or the
    /// header cannot be written. This is a fatal startup condition.
    pub fn create(path: &Path) -> Result<Self> {
        let sink_error = |source| Error::LogSink {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(sink_error)?;
        let mut log = Self::from_writer(BufWriter::new(file)).map_err(sink_error)?;
        log.path = Some(path.to_path_buf());
        Ok(log)
    }
}

impl<W: Write> CopyLog<W> {
    /// Wrap an arbitrary writer and write the header to it.
    pub fn from_writer(mut writer: W) -> io::Result<Self> {
        write_row(&mut writer, &LOG_HEADER)?;
        writer.flush()?;
        Ok(Self {
            writer,
            path: None,
            write_errors: 0,
            warn_handler: None,
        })
    }

    /// Route record-level write failures to `handler` instead of tracing.
    #[must_use]
    pub fn with_warn_handler(mut self, handler: fn(&str)) -> Self {
        self.warn_handler = Some(handler);
        self
    }

    /// Append one outcome row and flush it.
    pub fn record(&mut self, outcome: &CopyOutcome) {
        let relative = outcome
            .relative
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let destination = outcome
            .destination
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let source = outcome.source.display().to_string();
        let size = outcome.size.to_string();
        let timestamp = outcome.timestamp.format(TIMESTAMP_FORMAT).to_string();
        let error = outcome.error.as_deref().unwrap_or_default();

        let fields = [
            outcome.status.label(),
            relative.as_str(),
            source.as_str(),
            destination.as_str(),
            size.as_str(),
            timestamp.as_str(),
            error,
        ];

        let written = write_row(&mut self.writer, &fields).and_then(|()| self.writer.flush());
        if let Err(e) = written {
            self.write_errors += 1;
            let msg = format!(
                "Failed to write log record for {}: {}",
                outcome.source.display(),
                e
            );
            if let Some(handler) = self.warn_handler {
                handler(&msg);
            } else {
                #[cfg(feature = "tracing")]
                tracing::warn!("{}", msg);
            }
        }
    }

    /// Path of the backing file, if the log was opened with [`CopyLog::create`].
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Number of records that could not be written.
    pub fn write_errors(&self) -> usize {
        self.write_errors
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Consume the log and return the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

fn write_row<W: Write>(writer: &mut W, fields: &[&str]) -> io::Result<()> {
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            writer.write_all(b",")?;
        }
        write_field(writer, field)?;
    }
    writer.write_all(b"\n")
}

/// Quote a field when it contains a delimiter, quote or line break.
fn write_field<W: Write>(writer: &mut W, field: &str) -> io::Result<()> {
    if field.contains([',', '"', '\n', '\r']) {
        writer.write_all(b"\"")?;
        writer.write_all(field.replace('"', "\"\"").as_bytes())?;
        writer.write_all(b"\"")
    } else {
        writer.write_all(field.as_bytes())
    }
}
