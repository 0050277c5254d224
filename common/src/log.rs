//! Append-only, severity-leveled record of everything that happened during a run.
//!
//! The [`EventLog`] is created once at startup and handed by reference to every
//! stage. Appends are serialized behind a mutex so scanner workers and the main
//! sequence can log concurrently; sequence numbers follow append order.
//!
//! Verbosity only filters what rendered reports show. The artifact written by
//! [`EventLog::flush`] always contains every entry.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicI8, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::error::SetupError;

pub const MIN_VERBOSITY: i8 = -1;
pub const MAX_VERBOSITY: i8 = 3;
pub const DEFAULT_VERBOSITY: i8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
        }
    }

    /// Lowest severity shown at a verbosity level, `None` when everything is suppressed.
    pub fn threshold(verbosity: i8) -> Option<Severity> {
        match verbosity {
            i8::MIN..=-1 => None,
            0 => Some(Severity::Error),
            1 => Some(Severity::Warning),
            2 => Some(Severity::Info),
            _ => Some(Severity::Debug),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub sequence: u64,
    pub severity: Severity,
    pub message: String,
}

/// One line per entry: multi-line messages are folded with ` | `.
impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06} {:<7} ", self.sequence, self.severity)?;
        let mut lines = self.message.lines().map(str::trim).filter(|line| !line.is_empty());
        if let Some(first) = lines.next() {
            f.write_str(first)?;
        }
        for line in lines {
            write!(f, " | {line}")?;
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct EventLog {
    entries: Mutex<Vec<LogEntry>>,
    verbosity: AtomicI8,
}

impl Default for EventLog {
    fn default() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            verbosity: AtomicI8::new(DEFAULT_VERBOSITY),
        }
    }
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(verbosity: i8) -> Result<Self, SetupError> {
        let log = Self::new();
        log.set_verbosity(verbosity)?;
        Ok(log)
    }

    pub fn set_verbosity(&self, verbosity: i8) -> Result<(), SetupError> {
        if !(MIN_VERBOSITY..=MAX_VERBOSITY).contains(&verbosity) {
            return Err(SetupError::Verbosity(verbosity));
        }
        self.verbosity.store(verbosity, Ordering::Relaxed);
        Ok(())
    }

    pub fn verbosity(&self) -> i8 {
        self.verbosity.load(Ordering::Relaxed)
    }

    /// Appends an entry and returns its sequence number.
    pub fn log(&self, severity: Severity, message: impl Into<String>) -> u64 {
        let message: String = message.into();
        let sequence: u64 = {
            let mut entries = self.lock();
            let sequence = entries.len() as u64 + 1;
            entries.push(LogEntry {
                sequence,
                severity,
                message: message.clone(),
            });
            sequence
        };

        match severity {
            Severity::Debug => debug!(target: "aridi::log", "{message}"),
            Severity::Info => info!(target: "aridi::log", "{message}"),
            Severity::Warning => warn!(target: "aridi::log", "{message}"),
            Severity::Error => error!(target: "aridi::log", "{message}"),
        }
        sequence
    }

    pub fn debug(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Debug, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Info, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> u64 {
        self.log(Severity::Error, message)
    }

    /// Entries at or above `min_severity`, in sequence order.
    pub fn view(&self, min_severity: Severity) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.severity >= min_severity)
            .cloned()
            .collect()
    }

    /// What reports show under the configured verbosity.
    pub fn rendered_view(&self) -> Vec<LogEntry> {
        match Severity::threshold(self.verbosity()) {
            Some(min_severity) => self.view(min_severity),
            None => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Every entry, one line each, ignoring verbosity.
    pub fn artifact(&self) -> String {
        self.lock()
            .iter()
            .map(|entry| format!("{entry}\n"))
            .collect()
    }

    pub fn flush(&self, path: impl AsRef<Path>) -> io::Result<()> {
        fs::write(path, self.artifact())
    }

    // A panic while holding the lock must not take logging down with it.
    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
