//! Structured logging for the proxy delay checker
//!
//! Component loggers share one session id per run so lines coming from the
//! client, the executor and the profile writer can be correlated. Entries are
//! built fluently, carry typed fields and are rendered either for a terminal
//! or as JSON. Every entry goes to stderr.

use crate::error::{AppError, Result};
use crate::models::Settings;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::Arc;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Get ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",    // White
            LogLevel::Debug => "\x1b[36m",    // Cyan
            LogLevel::Info => "\x1b[32m",     // Green
            LogLevel::Warn => "\x1b[33m",     // Yellow
            LogLevel::Error => "\x1b[31m",    // Red
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Component that produced the entry
    pub logger: String,
    pub session_id: String,
    pub fields: BTreeMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
#[derive(Debug, Clone)]
pub struct Logger {
    enabled: bool,
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    session_id: Arc<str>,
}

impl Logger {
    /// Create a new logger with its own session id
    pub fn new(name: &str) -> Self {
        Self {
            enabled: true,
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name: name.to_string(),
            session_id: Arc::from(Uuid::new_v4().to_string()),
        }
    }

    /// Create a logger configured from runtime settings
    pub fn with_settings(name: &str, settings: &Settings) -> Self {
        let min_level = if settings.debug {
            LogLevel::Debug
        } else if settings.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: settings.enable_color,
            format: if settings.debug { LogFormat::Json } else { LogFormat::Console },
            ..Self::new(name)
        }
    }

    /// A logger that drops everything, handy in tests and library use
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::new("disabled")
        }
    }

    /// Derive a logger for another component sharing this session
    pub fn child(&self, name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..self.clone()
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        self.enabled && level >= self.min_level
    }

    fn write_entry(&self, entry: &LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        // stdout carries report lines only
        let _ = writeln!(io::stderr(), "{}", self.format_entry(entry));
    }

    /// Render an entry in this logger's format
    pub fn format_entry(&self, entry: &LogEntry) -> String {
        match self.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if !entry.fields.is_empty() {
            let fields_str: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields_str.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": {:?}}}", entry.message),
        }
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                session_id: logger.session_id.to_string(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Attach an error's category and message
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error", error.to_string())
    }

    /// Finish the entry without writing it
    pub fn build(self) -> LogEntry {
        self.entry
    }

    /// Write the entry
    pub fn log(self) {
        self.logger.write_entry(&self.entry);
    }
}

/// Hands out component loggers that share one session
pub struct LoggerFactory {
    root: Logger,
}

impl LoggerFactory {
    pub fn new(settings: &Settings) -> Self {
        Self {
            root: Logger::with_settings(crate::PKG_NAME, settings),
        }
    }

    pub fn root(&self) -> &Logger {
        &self.root
    }

    pub fn create(&self, component: &str) -> Logger {
        self.root.child(component)
    }

    pub fn session_id(&self) -> &str {
        self.root.session_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing_and_ordering() {
        assert_eq!("debug".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert!(LogLevel::Error > LogLevel::Info);
    }

    #[test]
    fn test_level_from_settings() {
        let mut settings = Settings::default();
        let logger = Logger::with_settings("test", &settings);
        assert!(!logger.would_log(LogLevel::Info));
        assert!(logger.would_log(LogLevel::Warn));

        settings.verbose = true;
        let logger = Logger::with_settings("test", &settings);
        assert!(logger.would_log(LogLevel::Info));
        assert!(!logger.would_log(LogLevel::Debug));

        settings.debug = true;
        let logger = Logger::with_settings("test", &settings);
        assert!(logger.would_log(LogLevel::Debug));
    }

    #[test]
    fn test_children_share_session() {
        let factory = LoggerFactory::new(&Settings::default());
        let client = factory.create("client");
        let executor = factory.create("executor");
        assert_eq!(client.session_id(), executor.session_id());
        assert_eq!(client.session_id(), factory.session_id());

        let entry = client.info("hello").build();
        assert_eq!(entry.logger, "client");
    }

    #[test]
    fn test_console_format_with_fields() {
        let settings = Settings { enable_color: false, verbose: true, ..Settings::default() };
        let logger = Logger::with_settings("executor", &settings);
        let entry = logger.info("checked proxy")
            .field("name", "HK-01")
            .field("delay_ms", 320)
            .build();

        let line = logger.format_entry(&entry);
        assert!(line.contains(" INFO [executor] checked proxy"));
        assert!(line.contains("delay_ms=320"));
        assert!(line.contains("name=\"HK-01\""));
    }

    #[test]
    fn test_debug_selects_json_format() {
        let settings = Settings { debug: true, ..Settings::default() };
        let logger = Logger::with_settings("client", &settings);
        let entry = logger.warn("request failed")
            .error_info(&AppError::upstream("refused"))
            .build();

        let line = logger.format_entry(&entry);
        let parsed: LogEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed.level, LogLevel::Warn);
        assert_eq!(parsed.fields["error_category"], "UPSTREAM");
    }

    #[test]
    fn test_disabled_logger() {
        let logger = Logger::disabled();
        assert!(!logger.would_log(LogLevel::Error));
        assert!(!logger.child("client").would_log(LogLevel::Error));
    }
}
