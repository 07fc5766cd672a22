//! Ordered log of one processing run.
//!
//! # Responsibility
//! - Collect info/warning entries for observation collaborators.
//! - Mirror every entry to the `log` facade with a stable event shape.
//!
//! # Invariants
//! - Entries keep insertion order.
//! - Each log carries a unique run id.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity of a process log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Warn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Process log for one reconciliation run of one landscape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessLog {
    landscape: String,
    run_id: Uuid,
    entries: Vec<LogEntry>,
}

impl ProcessLog {
    pub fn new(landscape: impl Into<String>) -> Self {
        Self {
            landscape: landscape.into(),
            run_id: Uuid::new_v4(),
            entries: Vec::new(),
        }
    }

    pub fn landscape(&self) -> &str {
        &self.landscape
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(
            "event=process_log module=input status=ok landscape={} run_id={} message={}",
            self.landscape, self.run_id, message
        );
        self.entries.push(LogEntry {
            level: LogLevel::Info,
            message,
        });
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(
            "event=process_log module=input status=warn landscape={} run_id={} message={}",
            self.landscape, self.run_id, message
        );
        self.entries.push(LogEntry {
            level: LogLevel::Warn,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.level == LogLevel::Warn)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
