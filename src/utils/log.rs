// src/utils/log.rs

//! Status log with console and file output.
//!
//! Every line is timestamped and leveled, printed to stdout and appended to
//! the configured log file. Nothing is written when the log is disabled.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::models::LoggingConfig;

/// Log level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "debug" => LogLevel::Debug,
            "info" => LogLevel::Info,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Format a log message with timestamp and level
fn format_log(level: LogLevel, message: &str) -> String {
    let timestamp = Local::now().format("%H:%M:%S");
    format!("[{}] [{}] {}", timestamp, level.as_str(), message)
}

/// Console + append-only file sink for status lines.
#[derive(Debug, Clone)]
pub struct StatusLog {
    enabled: bool,
    level: LogLevel,
    file: Option<PathBuf>,
}

impl StatusLog {
    /// Build a status log from configuration.
    pub fn new(config: &LoggingConfig) -> Self {
        let file = Some(config.log_file.trim())
            .filter(|path| !path.is_empty())
            .map(PathBuf::from);

        Self {
            enabled: config.debug,
            level: LogLevel::from_str(&config.level),
            file,
        }
    }

    /// A log that writes nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            level: LogLevel::Info,
            file: None,
        }
    }

    /// Log a debug message
    pub fn debug(&self, message: &str) {
        self.emit(LogLevel::Debug, message);
    }

    /// Log an info message
    pub fn info(&self, message: &str) {
        self.emit(LogLevel::Info, message);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str) {
        self.emit(LogLevel::Warn, message);
    }

    /// Status line for one subscription: fixed-width description and CRN.
    pub fn status(&self, description: &str, crn: &str, message: &str) {
        self.info(&format!("{description:<20} {crn:<8} {message}"));
    }

    fn should_log(&self, level: LogLevel) -> bool {
        self.enabled && level >= self.level
    }

    fn emit(&self, level: LogLevel, message: &str) {
        if !self.should_log(level) {
            return;
        }

        let line = format_log(level, message);
        println!("{line}");

        if let Some(path) = &self.file {
            if let Err(e) = append_line(path, &line) {
                log::warn!("Failed to append to log file {}: {}", path.display(), e);
            }
        }
    }
}

fn append_line(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn config(path: &Path, debug: bool, level: &str) -> LoggingConfig {
        LoggingConfig {
            debug,
            log_file: path.display().to_string(),
            level: level.to_string(),
        }
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::from_str("debug"), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("INFO"), LogLevel::Info);
        assert_eq!(LogLevel::from_str("unknown"), LogLevel::Info);
    }

    #[test]
    fn test_lines_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug_output.log");
        fs::write(&path, "previous run\n").unwrap();

        let log = StatusLog::new(&config(&path, true, "info"));
        log.status("CS101", "12345", "No availability found.");
        log.warn("Response returned status code of 503.");

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "previous run");
        assert!(lines[1].ends_with("[INFO] CS101                12345    No availability found."));
        assert!(lines[2].contains("[WARN] Response returned status code of 503."));
    }

    #[test]
    fn test_disabled_log_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug_output.log");

        let log = StatusLog::new(&config(&path, false, "info"));
        log.warn("should not appear");

        assert!(!path.exists());
    }

    #[test]
    fn test_level_filters_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug_output.log");

        let log = StatusLog::new(&config(&path, true, "warn"));
        log.info("hidden");
        log.debug("hidden");
        log.warn("shown");

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("shown"));
    }

    #[test]
    fn test_unwritable_file_does_not_panic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("debug_output.log");

        let log = StatusLog::new(&config(&path, true, "info"));
        log.info("still fine");
    }
}
