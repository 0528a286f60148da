#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! Logging sinks for the generator.
//!
//! Entry points take a `&dyn LogSink` instead of reaching for a process-wide
//! logger, so the verbosity of one run never leaks into another.

use std::sync::Mutex;

/// Verbosity level of messages that are always shown.
pub const LEVEL_NORMAL: u8 = 1;
/// Verbosity level of detailed progress messages.
pub const LEVEL_DETAIL: u8 = 4;
/// Verbosity used by `--debug`: everything.
pub const LEVEL_DEBUG: u8 = 100;

/// Destination of generator diagnostics
pub trait LogSink {
    /// Report a recoverable problem the user should know about
    fn warn(&self, module: &str, msg: &str);

    /// Report progress at the given verbosity level
    fn info(&self, level: u8, module: &str, msg: &str);
}

/// Sink that forwards to the `tracing` macros, filtered by verbosity
#[derive(Debug, Clone, Copy)]
pub struct TracingSink {
    verbosity: u8,
}

impl TracingSink {
    /// Create a sink showing messages up to `verbosity`
    pub fn new(verbosity: u8) -> Self { Self { verbosity } }

    /// The configured verbosity
    pub fn verbosity(&self) -> u8 { self.verbosity }
}

impl Default for TracingSink {
    fn default() -> Self { Self::new(LEVEL_NORMAL) }
}

impl LogSink for TracingSink {
    fn warn(&self, module: &str, msg: &str) {
        tracing::warn!(target: "microgen", module, "{}", msg);
    }

    fn info(&self, level: u8, module: &str, msg: &str) {
        if level > self.verbosity {
            return;
        }
        if level <= LEVEL_NORMAL {
            tracing::info!(target: "microgen", module, "{}", msg);
        } else {
            tracing::debug!(target: "microgen", module, level, "{}", msg);
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn warn(&self, _module: &str, _msg: &str) {}

    fn info(&self, _level: u8, _module: &str, _msg: &str) {}
}

/// Severity of a recorded message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Emitted through [`LogSink::warn`]
    Warning,
    /// Emitted through [`LogSink::info`] with its level
    Info(u8),
}

/// One message captured by a [`MemorySink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Message severity
    pub severity: Severity,
    /// Emitting module
    pub module: String,
    /// Message text
    pub message: String,
}

/// Sink that keeps every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self { Self::default() }

    /// Snapshot of all recorded messages
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Messages recorded as warnings
    pub fn warnings(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|r| r.severity == Severity::Warning)
            .map(|r| r.message)
            .collect()
    }

    fn push(&self, severity: Severity, module: &str, msg: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(LogRecord {
                severity,
                module: module.to_string(),
                message: msg.to_string(),
            });
        }
    }
}

impl LogSink for MemorySink {
    fn warn(&self, module: &str, msg: &str) { self.push(Severity::Warning, module, msg); }

    fn info(&self, level: u8, module: &str, msg: &str) {
        self.push(Severity::Info(level), module, msg);
    }
}
