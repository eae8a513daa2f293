//! Append-only activity log.
//!
//! Every folder creation and file move is recorded as one plain-text line:
//!
//! ```text
//! 2026-10-18 09:15:02 - INFO - Moved '/home/me/Desktop/a.pdf' to '/home/me/Desktop/Documents'
//! ```
//!
//! The log is an ordinary value owned by the caller and lent to the organizer,
//! so several runs (or tests) can each write to their own sink.

use chrono::Local;
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default log file name, created inside the organized directory.
pub const DEFAULT_LOG_FILE: &str = "desktidy.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Severity of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// The log file could not be opened.
#[derive(Debug, Error)]
#[error("Failed to open log file {}: {source}", .path.display())]
pub struct LogError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Line-oriented activity log writing to any [`Write`] sink.
pub struct ActivityLog {
    sink: Box<dyn Write>,
    write_failed: bool,
}

impl ActivityLog {
    /// Opens `path` in append mode, creating it if needed. Existing content is kept.
    pub fn open(path: &Path) -> Result<Self, LogError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|source| LogError {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_writer(file))
    }

    /// Wraps an arbitrary writer.
    pub fn from_writer<W: Write + 'static>(writer: W) -> Self {
        Self {
            sink: Box::new(writer),
            write_failed: false,
        }
    }

    /// Records an info-level event.
    pub fn info(&mut self, message: impl AsRef<str>) {
        self.record(LogLevel::Info, message.as_ref());
    }

    /// Records an error-level event.
    pub fn error(&mut self, message: impl AsRef<str>) {
        self.record(LogLevel::Error, message.as_ref());
    }

    /// Writes one line and flushes it.
    ///
    /// A failing sink never interrupts the caller; the first failure is
    /// reported on stderr and later ones are dropped silently.
    pub fn record(&mut self, level: LogLevel, message: &str) {
        let line = format_line(&Local::now().format(TIMESTAMP_FORMAT), level, message);
        let result = self
            .sink
            .write_all(line.as_bytes())
            .and_then(|()| self.sink.flush());

        if let Err(e) = result
            && !self.write_failed
        {
            self.write_failed = true;
            eprintln!("Warning: could not write to activity log: {}", e);
        }
    }
}

impl Drop for ActivityLog {
    fn drop(&mut self) {
        let _ = self.sink.flush();
    }
}

fn format_line(timestamp: &impl fmt::Display, level: LogLevel, message: &str) -> String {
    format!("{} - {} - {}\n", timestamp, level, message)
}
