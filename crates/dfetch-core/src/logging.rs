//! Logging init: `<timestamp> | <LEVEL> | <message>` lines on stderr or in a log file.
//!
//! The subscriber is installed as the default for the current thread and stays
//! active while the returned guard is held.

use anyhow::{Context, Result};
use std::fmt::{self, Write as _};
use std::fs;
use std::io::{self, Write as _};
use std::path::Path;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::{FormatEvent, FormatFields, Writer};
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event format: RFC 3339 timestamp, level and message separated by ` | `.
#[derive(Debug, Default)]
pub struct PipeFormat {
    timer: SystemTime,
}

impl<S, N> FormatEvent<S, N> for PipeFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        self.timer.format_time(&mut writer)?;
        write!(writer, " | {} | ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Per-event writer for `--log-file`: the shared log file handle, or stderr
/// for an event whose handle could not be duplicated.
enum FileOrStderr {
    File(fs::File),
    Stderr,
}

impl io::Write for FileOrStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            FileOrStderr::File(f) => f.write(buf),
            FileOrStderr::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            FileOrStderr::File(f) => f.flush(),
            FileOrStderr::Stderr => io::stderr().lock().flush(),
        }
    }
}

/// Hands each event its own clone of the opened log file.
struct FileMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for FileMakeWriter {
    type Writer = FileOrStderr;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(FileOrStderr::File)
            .unwrap_or(FileOrStderr::Stderr)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Builds the pipe-format subscriber writing to `make_writer`. Level filter
/// comes from `RUST_LOG`, default `info`.
pub fn build_subscriber<W>(make_writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    build_subscriber_with_filter(make_writer, env_filter())
}

/// Like [`build_subscriber`] with an explicit filter instead of `RUST_LOG`.
pub fn build_subscriber_with_filter<W>(
    make_writer: W,
    filter: EnvFilter,
) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .with_ansi(false)
        .event_format(PipeFormat::default())
        .finish()
}

/// Logs to stderr.
pub fn init_logging_stderr() -> DefaultGuard {
    tracing::subscriber::set_default(build_subscriber(io::stderr))
}

/// Appends logs to `path` (parent directories created). On failure returns
/// Err so the caller can fall back to [`init_logging_stderr`].
pub fn init_logging_file(path: &Path) -> Result<DefaultGuard> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create log directory {}", parent.display()))?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let guard = tracing::subscriber::set_default(build_subscriber(FileMakeWriter(file)));
    tracing::debug!("logging to {}", path.display());
    Ok(guard)
}
