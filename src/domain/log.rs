//! Operator-facing event log
//!
//! Entries are kept most recent first. The recorder is unbounded unless a
//! capacity is configured, in which case the oldest entries are dropped.

use std::collections::VecDeque;

use chrono::Local;

const TIME_FORMAT: &str = "%H:%M:%S";
const SEPARATOR: &str = "›";

/// A single timestamped log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub timestamp: String,
    pub message: String,
}

impl LogEntry {
    /// Create an entry stamped with the current local time
    pub fn now(message: impl Into<String>) -> Self {
        Self {
            timestamp: Local::now().format(TIME_FORMAT).to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.timestamp, SEPARATOR, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct LogRecorder {
    entries: VecDeque<LogEntry>,
    capacity: Option<usize>,
}

impl LogRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `capacity` entries; zero is treated as one
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity: Some(capacity.max(1)),
        }
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.entries.push_front(LogEntry::now(message));

        if let Some(capacity) = self.capacity {
            self.entries.truncate(capacity);
        }
    }

    /// Entries, most recent first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    /// Messages without timestamps, most recent first
    pub fn messages(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
