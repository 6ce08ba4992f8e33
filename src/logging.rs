//! Import log: an explicitly constructed logger handed to the import routine.
//!
//! Library code never touches the global `log` facade. Callers build an
//! [`ImportLog`] (usually [`ImportLog::to_file`]) and pass it down, so tests
//! can capture or drop entries without installing a process-wide logger.

use chrono::Local;
use env_logger::{Target, WriteStyle};
use log::{LevelFilter, Log, Record};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Timestamp layout for log file lines, e.g. `2024-05-01 13:02:11,417`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Write a record with the caller's file and line through an [`ImportLog`].
macro_rules! log_to {
    ($log:expr, $level:expr, $($arg:tt)+) => {
        $log.write(
            &::log::Record::builder()
                .args(format_args!($($arg)+))
                .level($level)
                .target(module_path!())
                .module_path_static(Some(module_path!()))
                .file_static(Some(file!()))
                .line(Some(line!()))
                .build(),
        )
    };
}

pub(crate) use log_to;

/// Logger object passed into the import routine.
pub struct ImportLog {
    inner: Box<dyn Log>,
}

impl ImportLog {
    /// Append `<timestamp> <file>:<line> <LEVEL> <message>` lines to `path`.
    pub fn to_file(path: impl AsRef<Path>, level: LevelFilter) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path.as_ref())?;

        let logger = env_logger::Builder::new()
            .filter_level(level)
            .write_style(WriteStyle::Never)
            .target(Target::Pipe(Box::new(file)))
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{} {}:{} {} {}",
                    Local::now().format(TIMESTAMP_FORMAT),
                    record.file().unwrap_or("<unknown>"),
                    record.line().unwrap_or(0),
                    record.level(),
                    record.args()
                )
            })
            .build();

        Ok(Self::from_logger(logger))
    }

    /// Wrap any `log::Log` implementation.
    pub fn from_logger(logger: impl Log + 'static) -> Self {
        Self {
            inner: Box::new(logger),
        }
    }

    /// A log that drops every entry.
    pub fn discard() -> Self {
        let logger = env_logger::Builder::new()
            .filter_level(LevelFilter::Off)
            .target(Target::Pipe(Box::new(io::sink())))
            .build();
        Self::from_logger(logger)
    }

    /// Forward a record if the wrapped logger accepts its level.
    pub fn write(&self, record: &Record<'_>) {
        if self.inner.enabled(record.metadata()) {
            self.inner.log(record);
        }
    }

    pub fn flush(&self) {
        self.inner.flush();
    }
}

impl std::fmt::Debug for ImportLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportLog").finish_non_exhaustive()
    }
}
