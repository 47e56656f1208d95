/// Structured logging for the flow forecast service
///
/// Provides context-rich logging with site identifiers, timestamps, and
/// severity levels. A `Logger` is a plain value handed to each component,
/// so two pipelines never share hidden logging state.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use crate::error::{ErrorKind, ForecastError};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warning),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Usgs,
    Model,
    Pipeline,
    Api,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Usgs => write!(f, "USGS"),
            DataSource::Model => write!(f, "MODEL"),
            DataSource::Pipeline => write!(f, "PIPE"),
            DataSource::Api => write!(f, "API"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - site has no data for the range, or the caller sent bad input
    Expected,
    /// Unexpected failure - indicates service degradation or an API change
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger
// ---------------------------------------------------------------------------

/// A captured log line, kept only by loggers built with `Logger::capture`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub source: DataSource,
    pub site_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Logger {
    /// Minimum log level to emit
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<PathBuf>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
    /// Write to stdout/stderr
    console: bool,
    /// In-memory sink, used by tests to assert on emitted entries
    captured: Option<Arc<Mutex<Vec<LogEntry>>>>,
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(LogLevel::Info, None, true)
    }
}

impl Logger {
    pub fn new(min_level: LogLevel, log_file: Option<PathBuf>, console_timestamps: bool) -> Self {
        Logger {
            min_level,
            log_file,
            console_timestamps,
            console: true,
            captured: None,
        }
    }

    /// Logger that records every entry in memory and prints nothing.
    pub fn capture(min_level: LogLevel) -> Self {
        Logger {
            min_level,
            log_file: None,
            console_timestamps: false,
            console: false,
            captured: Some(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Entries recorded so far. Empty unless built with `Logger::capture`.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.captured
            .as_ref()
            .and_then(|buf| buf.lock().ok().map(|entries| entries.clone()))
            .unwrap_or_default()
    }

    fn log(&self, level: LogLevel, source: DataSource, site_id: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        if let Some(buf) = &self.captured {
            if let Ok(mut entries) = buf.lock() {
                entries.push(LogEntry {
                    level,
                    source,
                    site_id: site_id.map(String::from),
                    message: message.to_string(),
                });
            }
        }

        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        let site_part = site_id.map(|s| format!(" [{}]", s)).unwrap_or_default();
        let log_entry = format!("{} {} {}{}: {}", timestamp, level, source, site_part, message);

        if self.console {
            if self.console_timestamps {
                match level {
                    LogLevel::Error | LogLevel::Warning => eprintln!("{}", log_entry),
                    LogLevel::Info | LogLevel::Debug => println!("{}", log_entry),
                }
            } else {
                match level {
                    LogLevel::Error => eprintln!("   ✗ {}{}: {}", source, site_part, message),
                    LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", source, site_part, message),
                    LogLevel::Info => println!("   {}", message),
                    LogLevel::Debug => println!("   [DEBUG] {}", message),
                }
            }
        }

        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path.display(), e);
            }
        }
    }

    fn append_to_file(path: &Path, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }

    pub fn info(&self, source: DataSource, site_id: Option<&str>, message: &str) {
        self.log(LogLevel::Info, source, site_id, message);
    }

    pub fn warn(&self, source: DataSource, site_id: Option<&str>, message: &str) {
        self.log(LogLevel::Warning, source, site_id, message);
    }

    pub fn error(&self, source: DataSource, site_id: Option<&str>, message: &str) {
        self.log(LogLevel::Error, source, site_id, message);
    }

    pub fn debug(&self, source: DataSource, site_id: Option<&str>, message: &str) {
        self.log(LogLevel::Debug, source, site_id, message);
    }

    /// Log a pipeline failure with automatic classification.
    ///
    /// `phase` names the step that failed (fetch, clean, forecast, ...).
    pub fn log_usgs_failure(
        &self,
        site_id: &str,
        reading_parameter: &str,
        phase: &str,
        err: &ForecastError,
    ) {
        let failure_type = classify_failure(err);
        let message = format!(
            "{} failed [{}] (parameter {}): {}",
            phase, failure_type, reading_parameter, err
        );

        match failure_type {
            FailureType::Expected => self.info(DataSource::Usgs, Some(site_id), &message),
            FailureType::Unexpected => self.error(DataSource::Usgs, Some(site_id), &message),
            FailureType::Unknown => self.warn(DataSource::Usgs, Some(site_id), &message),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a pipeline failure by its kind.
pub fn classify_failure(err: &ForecastError) -> FailureType {
    match err.kind() {
        // Sites routinely have no data for a range; callers send bad input.
        ErrorKind::InvalidArgument | ErrorKind::NoData => FailureType::Expected,
        // Short records are common for new or seasonal gauges.
        ErrorKind::InsufficientData => FailureType::Unknown,
        // HTTP errors and shape changes point at the service or an API change.
        ErrorKind::UpstreamUnavailable
        | ErrorKind::UpstreamContractViolation
        | ErrorKind::Unclassified => FailureType::Unexpected,
    }
}
