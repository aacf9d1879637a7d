//! Logging collaborator.
//!
//! The registry reports what it does as `(severity, tag, message)` records.
//! Sinks are fire-and-forget: `log` returns nothing, so nothing a sink does
//! can reach the caller of an invocation.

use std::fmt;

/// Severity of a diagnostic record, ordered from least to most severe.
///
/// Matches the Android log priorities the records usually end up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Verbose => "verbose",
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
        }
    }

    /// The `log` crate level this severity is emitted at.
    pub fn to_level(self) -> log::Level {
        match self {
            Severity::Verbose => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warn => log::Level::Warn,
            Severity::Error => log::Level::Error,
        }
    }

    /// The matching filter for logger initialisation.
    pub fn to_level_filter(self) -> log::LevelFilter {
        self.to_level().to_level_filter()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of diagnostic records.
pub trait LogSink: Send + Sync {
    fn log(&self, severity: Severity, tag: &str, message: &str);
}

/// Forwards records to the `log` facade, using the tag as the log target.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn log(&self, severity: Severity, tag: &str, message: &str) {
        log::log!(target: tag, severity.to_level(), "{}", message);
    }
}

/// Drops every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&self, _severity: Severity, _tag: &str, _message: &str) {}
}
