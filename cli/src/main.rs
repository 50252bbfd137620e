//! spcp - Span Copy
//!
//! Copy several source trees onto removable volumes, asking for the next
//! volume whenever the current one fills up. Powered by spancopy.

use clap::{Parser, ValueEnum};
use dialoguer::Input;
use indicatif::MultiProgress;
use serde_json::{Value, json};
use spancopy::{
    BarProgress, CopyLog, CopyOptions, CopyOutcome, CopyStats, DestinationVolume,
    Error as SpancopyError, ErrorCode, NoProgress, OsSpaceProbe, ProgressObserver, QueuedVolumes,
    VolumeSource, copy_roots, format_bytes, parse_volume_root,
};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// spcp - Copy source trees across removable volumes
///
/// Every file under every SOURCE is copied to the same relative path on the
/// current destination volume. When a file (plus the safety buffer) no longer
/// fits, you are asked for a new volume before anything is written.
///
/// Re-running the same command skips files that already exist with the same
/// size, so an interrupted run can simply be restarted.
///
/// Usage:
///   spcp SOURCE...                        (prompt for volumes)
///   spcp SOURCE... --volume DIR [--volume DIR]...
#[derive(Parser, Debug)]
#[command(name = "spcp", version, about, long_about = None)]
struct Args {
    /// Source root directories, in priority order
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Destination volume root (repeatable, used in order)
    ///
    /// Without this option, volumes are requested interactively.
    #[arg(long = "volume", value_name = "DIR")]
    volumes: Vec<PathBuf>,

    /// Give up after this many volume candidates
    #[arg(long, value_name = "N")]
    max_attempts: Option<usize>,

    /// Free space to keep on each volume (e.g. 100M, 1G)
    #[arg(long, value_name = "SIZE", default_value = "100M", value_parser = parse_size)]
    buffer: u64,

    /// Transfer chunk size (e.g. 64K, 1M)
    #[arg(long, value_name = "SIZE", default_value = "1M", value_parser = parse_chunk_size)]
    chunk_size: usize,

    /// Where to write the per-file CSV log (truncated every run)
    ///
    /// Columns: Status, RelativePath, SourcePath, Destination, SizeBytes,
    /// Timestamp, Error. The Error column is empty unless the file failed.
    #[arg(long, value_name = "PATH", default_value = spancopy::DEFAULT_LOG_PATH)]
    log: PathBuf,

    /// Do not preserve file timestamps
    #[arg(long)]
    no_times: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Disable progress bars
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Verbose output (debug logging and a detailed summary)
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Copy(#[from] SpancopyError),

    #[error("Failed to serialize JSON output: {source}")]
    JsonSerialize { source: serde_json::Error },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Copy(source) => source.code(),
            Self::JsonSerialize { .. } => ErrorCode::Internal,
        }
    }
}

/// Parse a byte size with an optional binary suffix (`K`, `M`, `G`, `T`).
fn parse_size(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();
    let split = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    let (digits, suffix) = trimmed.split_at(split);
    if digits.is_empty() {
        return Err(format!("invalid size '{input}': expected a number"));
    }
    let value: u64 = digits
        .parse()
        .map_err(|e| format!("invalid size '{input}': {e}"))?;

    let multiplier: u64 = match suffix.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" | "KIB" => 1 << 10,
        "M" | "MB" | "MIB" => 1 << 20,
        "G" | "GB" | "GIB" => 1 << 30,
        "T" | "TB" | "TIB" => 1 << 40,
        other => return Err(format!("invalid size '{input}': unknown unit '{other}'")),
    };
    value
        .checked_mul(multiplier)
        .ok_or_else(|| format!("invalid size '{input}': too large"))
}

fn parse_chunk_size(input: &str) -> Result<usize, String> {
    let bytes = parse_size(input)?;
    if bytes == 0 {
        return Err("chunk size must be at least 1 byte".to_string());
    }
    usize::try_from(bytes).map_err(|_| format!("chunk size '{input}' is too large"))
}

/// Asks the operator to mount a volume and type its root.
///
/// Progress bars are suspended while the prompt is shown.
struct ConsoleVolumes {
    multi: Option<MultiProgress>,
    attempts: usize,
    max_attempts: Option<usize>,
}

impl ConsoleVolumes {
    fn new(multi: Option<MultiProgress>, max_attempts: Option<usize>) -> Self {
        Self {
            multi,
            attempts: 0,
            max_attempts,
        }
    }

    fn ask(&self, prompt: &str) -> dialoguer::Result<String> {
        let read = || {
            Input::<String>::new()
                .with_prompt(format!("{prompt} (path to the volume root)"))
                .interact_text()
        };
        match &self.multi {
            Some(multi) => multi.suspend(read),
            None => read(),
        }
    }
}

impl VolumeSource for ConsoleVolumes {
    fn acquire(&mut self, prompt: &str) -> spancopy::Result<DestinationVolume> {
        loop {
            if self.max_attempts.is_some_and(|max| self.attempts >= max) {
                return Err(SpancopyError::NoVolumeAvailable {
                    attempts: self.attempts,
                });
            }

            let input = match self.ask(prompt) {
                Ok(input) => input,
                Err(e) => {
                    tracing::warn!("Cannot prompt for a volume: {}", e);
                    return Err(SpancopyError::NoVolumeAvailable {
                        attempts: self.attempts,
                    });
                }
            };
            self.attempts += 1;

            match parse_volume_root(&input) {
                Some(root) if root.is_dir() => return Ok(DestinationVolume::new(root)),
                Some(root) => eprintln!(
                    "{} is not an accessible directory, please try again",
                    root.display()
                ),
                None => eprintln!("Please enter the path of a mounted volume"),
            }
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "spancopy=debug,info" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(error) = run(&args) {
        if args.output == OutputMode::Json {
            let failure = json!({
                "error": {
                    "code": error.code().as_str(),
                    "message": error.to_string(),
                }
            });
            let _ = print_json_value(&failure);
        }
        eprintln!("error[{}]: {}", error.code(), error);
        // clap has already exited with 2 for usage errors
        std::process::exit(1);
    }
}

fn run(args: &Args) -> CliResult<()> {
    let options = build_options(args);

    // The log is opened before anything else touches the filesystem
    let mut log = CopyLog::create(&options.log_path)?;

    let show_bars = args.output == OutputMode::Human && !args.quiet;
    let mut bars = show_bars.then(BarProgress::new);
    let multi = bars.as_ref().map(BarProgress::multi);

    let mut volumes: Box<dyn VolumeSource> = if args.volumes.is_empty() {
        Box::new(ConsoleVolumes::new(multi, args.max_attempts))
    } else {
        let mut queue = QueuedVolumes::new(args.volumes.iter().cloned());
        if let Some(max) = args.max_attempts {
            queue = queue.with_max_attempts(max);
        }
        Box::new(queue)
    };

    let mut quiet = NoProgress;
    let progress: &mut dyn ProgressObserver = match bars.as_mut() {
        Some(bars) => bars,
        None => &mut quiet,
    };

    let stats = copy_roots(
        &options,
        volumes.as_mut(),
        &OsSpaceProbe,
        progress,
        &mut log,
    )?;

    if log.write_errors() > 0 {
        tracing::warn!(
            "{} row(s) could not be written to {}",
            log.write_errors(),
            options.log_path.display()
        );
    }

    match args.output {
        OutputMode::Human => print_stats(&stats, &options.log_path, args.verbose),
        OutputMode::Json => print_json_value(&stats_to_json(&stats, &options.log_path))?,
    }
    Ok(())
}

fn build_options(args: &Args) -> CopyOptions {
    let mut options = CopyOptions::new(args.sources.iter().cloned())
        .with_safety_buffer(args.buffer)
        .with_chunk_size(args.chunk_size)
        .with_log_path(&args.log);
    if args.no_times {
        options = options.without_timestamps();
    }
    options
}

fn print_stats(stats: &CopyStats, log_path: &Path, verbose: bool) {
    if stats.files_copied == 0 && stats.files_failed == 0 {
        if stats.files_skipped > 0 {
            println!(
                "Nothing to copy ({} files already exist)",
                stats.files_skipped
            );
        } else {
            println!("Nothing to copy");
        }
    } else if verbose {
        println!("Copy completed in {:?}", stats.duration);
        println!("  Files copied:   {}", stats.files_copied);
        println!("  Files skipped:  {}", stats.files_skipped);
        println!("  Not under root: {}", stats.files_unresolved);
        println!("  Files failed:   {}", stats.files_failed);
        println!("  Total size:     {}", format_bytes(stats.bytes_copied));
        println!("  Volumes:");
        for volume in &stats.volumes {
            println!("    {}", volume.display());
        }

        if stats.duration.as_secs_f64() > 0.0 {
            let speed = stats.bytes_copied as f64 / stats.duration.as_secs_f64();
            println!("  Speed:          {}/s", format_bytes(speed as u64));
        }
    } else {
        let mut parts = vec![format!("{} files", stats.files_copied)];
        if stats.files_skipped > 0 {
            parts.push(format!("{} skipped", stats.files_skipped));
        }
        if stats.volumes.len() > 1 {
            parts.push(format!("{} volumes", stats.volumes.len()));
        }
        println!(
            "Copied {} ({})",
            parts.join(", "),
            format_bytes(stats.bytes_copied)
        );
    }

    if stats.files_failed > 0 {
        println!(
            "{} file(s) failed, see {}",
            stats.files_failed,
            log_path.display()
        );
    }
}

fn outcome_to_json(outcome: &CopyOutcome) -> Value {
    json!({
        "status": outcome.status.label(),
        "source": display_path(&outcome.source),
        "relative_path": outcome.relative.as_deref().map(display_path),
        "destination": outcome.destination.as_deref().map(display_path),
        "size": outcome.size,
        "timestamp": outcome.timestamp.to_rfc3339(),
        "error": outcome.error,
    })
}

fn stats_to_json(stats: &CopyStats, log_path: &Path) -> Value {
    json!({
        "files_copied": stats.files_copied,
        "files_skipped": stats.files_skipped,
        "files_unresolved": stats.files_unresolved,
        "files_failed": stats.files_failed,
        "bytes_copied": stats.bytes_copied,
        "duration_ms": u64::try_from(stats.duration.as_millis()).unwrap_or(u64::MAX),
        "volumes": stats.volumes.iter().map(|v| display_path(v)).collect::<Vec<_>>(),
        "log": display_path(log_path),
        "outcomes": stats.outcomes.iter().map(outcome_to_json).collect::<Vec<_>>(),
    })
}

fn print_json_value(value: &Value) -> CliResult<()> {
    let serialized =
        serde_json::to_string(value).map_err(|source| CliError::JsonSerialize { source })?;
    println!("{serialized}");
    Ok(())
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}
