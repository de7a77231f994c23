//! Leveled report sink.
//!
//! A `ReportLogger` is created once per run and handed to every stage by
//! `&mut` reference. Each line is kept in memory, mirrored to `tracing` for
//! console output, and appended to the log file when one is attached.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{Local, NaiveDateTime};
use tracing::{error, info, warn};

use crate::issue::{Issue, Severity};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: NaiveDateTime,
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for LogLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.severity,
            self.message
        )
    }
}

pub struct ReportLogger {
    file: Option<BufWriter<File>>,
    lines: Vec<LogLine>,
    write_error: Option<io::Error>,
}

impl ReportLogger {
    /// Logger without a file sink; lines go to `tracing` and memory only.
    pub fn in_memory() -> Self {
        Self {
            file: None,
            lines: Vec::new(),
            write_error: None,
        }
    }

    /// Opens (or creates) `path` in append mode, creating parent directories.
    pub fn open(path: &Path) -> io::Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Some(BufWriter::new(file)),
            lines: Vec::new(),
            write_error: None,
        })
    }

    pub fn log(&mut self, severity: Severity, message: impl Into<String>) {
        let line = LogLine {
            timestamp: Local::now().naive_local(),
            severity,
            message: message.into(),
        };

        match severity {
            Severity::Error => error!(severity = severity.as_str(), "{}", line.message),
            Severity::Warn => warn!(severity = severity.as_str(), "{}", line.message),
            Severity::Pass | Severity::Info => info!(severity = severity.as_str(), "{}", line.message),
        }

        // The first write failure is kept and surfaced by `flush`/`close`.
        if let Some(file) = self.file.as_mut() {
            if let Err(err) = writeln!(file, "{line}") {
                self.write_error.get_or_insert(err);
            }
        }

        self.lines.push(line);
    }

    pub fn pass(&mut self, message: impl Into<String>) {
        self.log(Severity::Pass, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(Severity::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Severity::Error, message);
    }

    pub fn issue(&mut self, issue: &Issue) {
        self.log(issue.severity(), issue.to_string());
    }

    pub fn section(&mut self, title: &str) {
        self.info("=".repeat(60));
        self.info(title);
        self.info("=".repeat(60));
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }

    pub fn flush(&mut self) -> io::Result<()> {
        if let Some(err) = self.write_error.take() {
            return Err(err);
        }
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }

    pub fn close(mut self) -> io::Result<()> {
        self.flush()?;
        if let Some(file) = self.file.take() {
            file.into_inner().map_err(|err| err.into_error())?.sync_all()?;
        }
        Ok(())
    }
}
