use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeZone};
use tracing::{subscriber::SetGlobalDefaultError, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

/// The handle for the log file writer (dropping it will flush and disable the
/// log writer).
pub struct LogHandle {
    #[allow(dead_code)]
    guard: WorkerGuard,
    path: PathBuf,
}

impl LogHandle {
    /// Path of the log file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

/// Installs the global tracing subscriber. Events are written to stdout and to
/// a new file in `dir` named after the current local time.
///
/// The log level defaults to INFO and can be overridden with the `RUST_LOG`
/// environment variable.
pub fn init<P: AsRef<Path>>(dir: P) -> Result<LogHandle, SetGlobalDefaultError> {
    let file_name = log_file_name(&chrono::Local::now());
    let file_appender = tracing_appender::rolling::never(dir.as_ref(), &file_name);
    let (non_blocking_log_writer, guard) = tracing_appender::non_blocking(file_appender);

    let collector = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .with(fmt::layer().with_writer(std::io::stdout))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking_log_writer),
        );
    tracing::subscriber::set_global_default(collector)?;

    Ok(LogHandle {
        guard,
        path: dir.as_ref().join(file_name),
    })
}

/// Name of a log file created at a given time.
pub fn log_file_name<Tz>(time: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    time.format("%Y-%m-%d_%H-%M-%S.log").to_string()
}
